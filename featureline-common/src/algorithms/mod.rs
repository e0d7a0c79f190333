/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 04/09/2026
Last Modified: 04/10/2026
License: MIT
*/
// private sub-module defined in other files
mod bearing;
mod corridor_assembly;
mod endpoint_graph;
mod gap_closure;
mod line_ops;
mod near_table;
mod relative_angles;

// exports identifiers from private sub-modules in the current module namespace
pub use self::bearing::{
    line_bearing, relative_angle, reverse_bearing, smallest_angle_difference, to_azimuth,
};
pub use self::corridor_assembly::{assemble_corridors, CorridorAssembly, CorridorRecord};
pub use self::endpoint_graph::{
    first_node_id, is_first_node, last_node_id, owning_line, EndRole, Endpoint, EndpointGraph,
};
pub use self::gap_closure::{
    close_gaps, close_gaps_with_options, link_endpoints, ConnectorLine, GapClosure,
    GapClosureOptions, RESERVED_ID_FIELD,
};
pub use self::line_ops::{
    pull_line, sample_from_centre, split_by_count, split_by_length, whisker,
};
pub use self::near_table::{generate_line_near_table, generate_point_near_table, NearRecord};
pub use self::relative_angles::{relative_angles, RelativeAngleRecord};
