pub use crate::load_cycle::{CycleRejection, LoadCycle, LoadCyclePoint, LoadSegment};
pub use crate::losses::Losses;
pub use crate::materials::{
    ConductorKind, CoolingExponents, CoolingMode, FluidKind, MaterialTables,
};
pub use crate::overload::{
    ExponentOverrides, MaxTemp, OverloadModel, RunOptions, RunSummary, SavedData,
    SavedDataHistoryVec,
};
pub use crate::overload_iter::{OverloadRunVec, OverloadScenario};
pub use crate::temperatures::Temperatures;
pub use crate::traits::{ApproxEq, SerdeAPI};
