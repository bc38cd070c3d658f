use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("market manager is no longer running")]
    ManagerStopped,

    #[error("unknown settings key: {0}")]
    UnknownSetting(String),

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("unknown sort direction: {0} (expected asc or desc)")]
    UnknownSortDirection(String),
}
