pub mod bundle;
pub mod normalize;
pub mod rows;

pub use bundle::{
    MetricsBundle,
    MetricsLayout,
    DEFAULT_METRICS,
};
pub use normalize::{
    normalize,
    normalize_scalar_column,
    NonFinitePolicy,
    PlainValue,
};
pub use rows::{
    ResultRecord,
    ResultRow,
    RowBuilder,
};
