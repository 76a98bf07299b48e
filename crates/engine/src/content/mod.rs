mod stages;

pub use stages::{
    compile_stage_defs, compile_stage_defs_str, ContentCompileError, ContentErrorCode,
    SourceLocation, StageDef, TileCoord,
};
