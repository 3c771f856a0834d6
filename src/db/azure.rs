use crate::config::AzureSqlConfig;
use crate::db::rows;
use crate::error::InsightError;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, Query};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, warn};

pub const STANDARD_PORT: u16 = 1433;

pub type SqlClient = Client<Compat<TcpStream>>;

/// Which product-code column a usage query filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductColumn {
    Cip13,
    GenNum,
}

impl ProductColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            ProductColumn::Cip13 => "CIP13",
            ProductColumn::GenNum => "GEN_NUM",
        }
    }
}

/// One raw usage row from `dbo.MedicData`, before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRow {
    pub region: String,
    pub sex: String,
    pub age: String,
    pub product: String,
    pub prescriber: String,
    pub boxes: f64,
}

/// Connection factory for the Azure SQL database. Holds a prepared tiberius
/// config; every call opens a fresh TCP connection, mirroring the
/// per-query connection discipline of the service this backs.
#[derive(Clone)]
pub struct AzureSqlConnection {
    config: Config,
}

impl AzureSqlConnection {
    pub fn new(cfg: &AzureSqlConfig) -> Self {
        let mut config = Config::new();
        config.host(&cfg.server);
        config.port(STANDARD_PORT);
        config.database(&cfg.database);
        config.authentication(AuthMethod::sql_server(&cfg.username, &cfg.password));
        config.encryption(EncryptionLevel::Required);
        Self { config }
    }

    pub async fn connect(&self) -> Result<SqlClient, InsightError> {
        let tcp = TcpStream::connect(self.config.get_addr()).await?;
        tcp.set_nodelay(true)?;
        let client = Client::connect(self.config.clone(), tcp.compat_write()).await?;
        Ok(client)
    }

    /// Run `SELECT 1` and report reachability. Errors are logged, never
    /// returned with connection details attached.
    pub async fn test_connection(&self) -> bool {
        match self.try_select_one().await {
            Ok(()) => {
                info!("connection successful");
                true
            }
            Err(e) => {
                warn!(error = %e, "connection test failed");
                false
            }
        }
    }

    async fn try_select_one(&self) -> Result<(), InsightError> {
        let mut client = self.connect().await?;
        let stream = client.simple_query("SELECT 1").await?;
        stream.into_first_result().await?;
        Ok(())
    }

    /// Fetch the usage rows for a set of product codes, filtering on the
    /// given column. Codes are bound as `@P1..@Pn` parameters.
    pub async fn query_usage_rows(
        &self,
        column: ProductColumn,
        codes: &[String],
    ) -> Result<Vec<UsageRow>, InsightError> {
        if codes.is_empty() {
            return Err(InsightError::EmptyCodeList(column.as_sql()));
        }

        let placeholders = (1..=codes.len())
            .map(|i| format!("@P{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT BEN_REG, sexe, age, {col}, PSP_SPE, BOITES \
             FROM dbo.MedicData WHERE {col} IN ({placeholders})",
            col = column.as_sql(),
        );

        let mut client = self.connect().await?;
        let mut query = Query::new(sql);
        for code in codes {
            query.bind(code.as_str());
        }
        let result = query.query(&mut client).await?;
        let raw = result.into_first_result().await?;

        let total = raw.len();
        let usage: Vec<UsageRow> = raw.into_iter().filter_map(rows::into_usage_row).collect();
        if usage.len() < total {
            debug!(
                column = column.as_sql(),
                skipped = total - usage.len(),
                "dropped rows with null segment columns"
            );
        }
        Ok(usage)
    }
}
