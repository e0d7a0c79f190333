// private sub-module defined in other files
mod feature_line_corridor_assembly;
mod feature_line_gap_closure;
mod feature_line_pull;
mod feature_line_relative_angle;
mod feature_line_split;
mod feature_line_whiskers;

// exports identifiers from private sub-modules in the current module namespace
pub use self::feature_line_corridor_assembly::FeatureLineCorridorAssembly;
pub use self::feature_line_gap_closure::FeatureLineGapClosure;
pub use self::feature_line_pull::FeatureLinePull;
pub use self::feature_line_relative_angle::FeatureLineRelativeAngle;
pub use self::feature_line_split::FeatureLineSplit;
pub use self::feature_line_whiskers::FeatureLineWhiskers;
