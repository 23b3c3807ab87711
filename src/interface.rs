use crate::connection::Connection;

/// Lookups a host framework expects from a secrets backend.
pub trait SecretsBackend {
    type Error: std::error::Error;

    /// Connections stored under `conn_id`: a list of one, or `None` when unknown.
    fn get_connections(&self, conn_id: &str) -> Result<Option<Vec<Connection>>, Self::Error>;

    /// Value of the variable `key`, or `None` when unknown.
    fn get_variable(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// First connection stored under `conn_id`.
    fn get_connection(&self, conn_id: &str) -> Result<Option<Connection>, Self::Error> {
        Ok(self
            .get_connections(conn_id)?
            .and_then(|conns| conns.into_iter().next()))
    }

    /// Configuration lookups are not served by default.
    fn get_config(&self, _key: &str) -> Result<Option<String>, Self::Error> {
        Ok(None)
    }
}
