use crate::error::{Error, Result};
use crate::metadata::{ClusterInfo, DataType, TimeSeries};

use super::{TabularResult, assemble_tabular};

/// Statement category reported with an executed SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlKind {
    Query,
    ShowTimeSeries,
    GetReplicaNum,
    CountPoints,
    ShowClusterInfo,
    /// Statements with no result payload (inserts, deletes, DDL).
    Other,
}

/// Raw response of an executed SQL statement, as handed over by the RPC layer.
#[derive(Debug, Clone, Copy)]
pub struct SqlResponse<'a> {
    pub kind: SqlKind,
    pub parse_error: Option<&'a str>,
    pub paths: &'a [String],
    pub type_tags: &'a [i32],
    pub timestamps: &'a [u8],
    pub values_list: &'a [Vec<u8>],
    pub bitmap_list: &'a [Vec<u8>],
    pub replica_num: i32,
    pub points_num: i64,
    /// Topology converted by the RPC layer for `ShowClusterInfo` statements.
    pub cluster_info: Option<&'a ClusterInfo>,
}

/// Decoded payload of an executed SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlPayload<'a> {
    Query(TabularResult<'a>),
    ShowTimeSeries(Vec<TimeSeries>),
    ReplicaNum(i32),
    CountPoints(i64),
    ClusterInfo(ClusterInfo),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult<'a> {
    pub parse_error: Option<String>,
    pub payload: SqlPayload<'a>,
}

impl<'a> SqlResult<'a> {
    /// Decodes the payload matching the statement kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] for unknown type tags and propagates
    /// decoding failures for query payloads.
    pub fn assemble(response: SqlResponse<'a>) -> Result<Self> {
        let payload = match response.kind {
            SqlKind::Query => {
                let types = DataType::from_tags(response.type_tags)?;
                SqlPayload::Query(assemble_tabular(
                    response.paths.to_vec(),
                    types,
                    response.timestamps,
                    response.values_list,
                    response.bitmap_list,
                )?)
            }
            SqlKind::ShowTimeSeries => {
                if response.paths.len() != response.type_tags.len() {
                    return Err(Error::validation(format!(
                        "{} series paths but {} data types",
                        response.paths.len(),
                        response.type_tags.len()
                    )));
                }
                let series = response
                    .paths
                    .iter()
                    .zip(response.type_tags)
                    .map(|(path, &tag)| Ok(TimeSeries::new(path.clone(), DataType::try_from(tag)?)))
                    .collect::<Result<Vec<_>>>()?;
                SqlPayload::ShowTimeSeries(series)
            }
            SqlKind::GetReplicaNum => SqlPayload::ReplicaNum(response.replica_num),
            SqlKind::CountPoints => SqlPayload::CountPoints(response.points_num),
            SqlKind::ShowClusterInfo => {
                SqlPayload::ClusterInfo(response.cluster_info.cloned().unwrap_or_default())
            }
            SqlKind::Other => SqlPayload::Empty,
        };
        Ok(Self {
            parse_error: response
                .parse_error
                .filter(|message| !message.is_empty())
                .map(str::to_owned),
            payload,
        })
    }

    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self.payload, SqlPayload::Query(_))
    }

    #[must_use]
    pub const fn query(&self) -> Option<&TabularResult<'a>> {
        match &self.payload {
            SqlPayload::Query(table) => Some(table),
            _ => None,
        }
    }
}
