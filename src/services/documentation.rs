use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Tally Board Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::scores::submit_score,
        crate::routes::scores::list_scores,
        crate::routes::scores::get_score,
        crate::routes::scores::approve_score,
        crate::routes::scores::reject_score,
        crate::routes::rankings::rankings,
        crate::routes::timers::start_timer,
        crate::routes::timers::stop_timer,
        crate::routes::timers::list_timers,
        crate::routes::sse::user_stream,
        crate::routes::sse::team_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::score::SubmitScoreRequest,
            crate::dto::score::ApproveScoreRequest,
            crate::dto::score::RejectScoreRequest,
            crate::dto::score::ScoreSummary,
            crate::dto::ranking::PeriodWindow,
            crate::dto::ranking::RankingEntry,
            crate::dto::timer::StartTimerRequest,
            crate::dto::timer::StopTimerRequest,
            crate::dto::timer::TimerSummary,
            crate::dto::timer::TimerState,
            crate::dto::events::ScoreStatusEvent,
            crate::dto::events::ScoreNewEvent,
            crate::dto::events::TeamAddedEvent,
            crate::dto::events::ActivityChangeEvent,
            crate::dto::events::SubActivityChangeEvent,
            crate::dto::events::FeedbackNewEvent,
            crate::dto::events::TimerEndedEvent,
            crate::dto::events::ChangeKind,
            crate::dao::models::ScoreContext,
            crate::dao::models::ScoreStatusKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scores", description = "Score submission and resolution"),
        (name = "rankings", description = "Leaderboard queries"),
        (name = "timers", description = "Activity countdown timers"),
        (name = "sse", description = "Server-sent events rooms"),
    )
)]
pub struct ApiDoc;
