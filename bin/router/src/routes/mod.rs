pub mod defaults;
pub mod interpolation;
pub mod table;

pub use defaults::{default_route_table, default_routes};
pub use interpolation::{interpolate, placeholders, RouteParams};
pub use table::{
    Access, RouteDescriptor, RouteMatch, RouteName, RouteTable, RouteTableError, ViewLoading,
    ViewRef,
};
