use sqlx::PgPool;

/// Executes entity queries against the connection pool.
///
/// Every SQL operation is a request type with a `Processor` impl on this
/// struct, see [`crate::entities`].
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
