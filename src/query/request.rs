use serde::Serialize;
use std::fmt::{self, Display};

/// A `column = value` pair, used for insert values, update assignments and
/// the single `where` filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnValue {
    pub column: String,
    pub value: String,
}

impl ColumnValue {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    Help,
    Status,
    Stop,
    Start,
    Select {
        table: String,
        filter: Option<ColumnValue>,
    },
    Subscribe {
        table: String,
        filter: Option<ColumnValue>,
    },
    Unsubscribe {
        table: String,
    },
    Insert {
        table: String,
        values: Vec<ColumnValue>,
    },
    Update {
        table: String,
        values: Vec<ColumnValue>,
        filter: Option<ColumnValue>,
    },
    Delete {
        table: String,
        filter: Option<ColumnValue>,
    },
    Mysql {
        request: MysqlRequest,
    },
}

/// Requests to the mysql bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MysqlRequest {
    Connect { address: String },
    Disconnect,
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Help,
    Status,
    Stop,
    Start,
    Select,
    Subscribe,
    Unsubscribe,
    Insert,
    Update,
    Delete,
    MysqlConnect,
    MysqlDisconnect,
    MysqlSubscribe,
    MysqlUnsubscribe,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Help => "help",
            RequestKind::Status => "status",
            RequestKind::Stop => "stop",
            RequestKind::Start => "start",
            RequestKind::Select => "select",
            RequestKind::Subscribe => "subscribe",
            RequestKind::Unsubscribe => "unsubscribe",
            RequestKind::Insert => "insert",
            RequestKind::Update => "update",
            RequestKind::Delete => "delete",
            RequestKind::MysqlConnect => "mysql connect",
            RequestKind::MysqlDisconnect => "mysql disconnect",
            RequestKind::MysqlSubscribe => "mysql subscribe",
            RequestKind::MysqlUnsubscribe => "mysql unsubscribe",
        }
    }
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Help => RequestKind::Help,
            Request::Status => RequestKind::Status,
            Request::Stop => RequestKind::Stop,
            Request::Start => RequestKind::Start,
            Request::Select { .. } => RequestKind::Select,
            Request::Subscribe { .. } => RequestKind::Subscribe,
            Request::Unsubscribe { .. } => RequestKind::Unsubscribe,
            Request::Insert { .. } => RequestKind::Insert,
            Request::Update { .. } => RequestKind::Update,
            Request::Delete { .. } => RequestKind::Delete,
            Request::Mysql { request } => match request {
                MysqlRequest::Connect { .. } => RequestKind::MysqlConnect,
                MysqlRequest::Disconnect => RequestKind::MysqlDisconnect,
                MysqlRequest::Subscribe => RequestKind::MysqlSubscribe,
                MysqlRequest::Unsubscribe => RequestKind::MysqlUnsubscribe,
            },
        }
    }

    /// Table the request targets, if any.
    pub fn table(&self) -> Option<&str> {
        match self {
            Request::Select { table, .. }
            | Request::Subscribe { table, .. }
            | Request::Unsubscribe { table }
            | Request::Insert { table, .. }
            | Request::Update { table, .. }
            | Request::Delete { table, .. } => Some(table),
            _ => None,
        }
    }
}
