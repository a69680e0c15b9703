//! Decoded Lmod spider cache tables
//!
//! The cache itself is Lua source; an external `lua` run dumps the
//! `mpathMapT` and `spiderT` tables as JSON. This module only deals with that
//! JSON dump.

pub mod lua_table;
pub mod tables;

pub use lua_table::LuaTable;
pub use tables::{
    DefaultDeclaration, LmodTables, ModulePathTable, PackageRecord, SpiderTable, VersionRecord,
};
