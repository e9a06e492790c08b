pub mod ddl;
mod descriptor;
mod postgres;

pub use ddl::{build_core_ddl, build_staging_ddl, map_declared_type, quote_ident};
pub use descriptor::TableDescriptor;
pub use postgres::PostgresCatalog;
