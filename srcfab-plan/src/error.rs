use srcfab_store::StoreError;
use srcfab_types::UnitId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// A rule maker failed; names the maker.
    #[error("rule maker {maker}: {source}")]
    RuleMaker {
        maker: String,
        #[source]
        source: Box<PlanError>,
    },

    #[error("choose {op} tool for unit {unit}: {source:#}")]
    ToolChoice {
        op: String,
        unit: UnitId,
        #[source]
        source: anyhow::Error,
    },

    #[error("no blame rule found corresponding to graph rule for unit ID {:?}", .unit.as_str())]
    MissingBlameRule { unit: UnitId },

    #[error("data type for {op} rules: {source}")]
    DataType {
        op: String,
        #[source]
        source: StoreError,
    },
}

impl PlanError {
    /// The innermost error, below any rule-maker wrapping.
    pub fn root(&self) -> &PlanError {
        match self {
            PlanError::RuleMaker { source, .. } => source.root(),
            other => other,
        }
    }
}
