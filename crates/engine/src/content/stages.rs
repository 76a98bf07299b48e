use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    MissingElement,
    DuplicateElement,
    MissingAttribute,
    InvalidValue,
    DuplicateStage,
    NonContiguousStages,
    NoStages,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

/// Grid cell position in a stage map, column first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub col: u32,
    pub row: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDef {
    pub number: u32,
    pub map_file: String,
    pub spawn: TileCoord,
    pub enemies: Vec<TileCoord>,
}

/// Reads and validates a `<Stages>` document. Stages come back ordered by
/// number, and the numbers are guaranteed to run 1..=N without gaps.
pub fn compile_stage_defs(path: &Path) -> Result<Vec<StageDef>, ContentCompileError> {
    let raw = fs::read_to_string(path).map_err(|error| ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read stage table: {error}"),
        file_path: path.to_path_buf(),
        location: None,
    })?;
    compile_stage_defs_str(path, &raw)
}

pub fn compile_stage_defs_str(
    file_path: &Path,
    raw: &str,
) -> Result<Vec<StageDef>, ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let ctx = ParseContext {
        file_path,
        doc: &doc,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Stages" {
        return Err(ctx.error_at(
            ContentErrorCode::InvalidRoot,
            "root element must be <Stages>".to_string(),
            root,
        ));
    }

    let mut stages = Vec::<(StageDef, Node<'_, '_>)>::new();
    for child in root.children().filter(Node::is_element) {
        if child.tag_name().name() != "Stage" {
            return Err(ctx.error_at(
                ContentErrorCode::UnknownElement,
                format!(
                    "unsupported element <{}>; only <Stage> is allowed here",
                    child.tag_name().name()
                ),
                child,
            ));
        }
        stages.push((ctx.parse_stage(child)?, child));
    }

    if stages.is_empty() {
        return Err(ctx.error_at(
            ContentErrorCode::NoStages,
            "stage table must define at least one <Stage>".to_string(),
            root,
        ));
    }

    stages.sort_by_key(|(stage, _)| stage.number);
    for (index, (stage, node)) in stages.iter().enumerate() {
        let expected = index as u32 + 1;
        if stage.number == expected {
            continue;
        }
        let (code, message) = if stage.number < expected {
            (
                ContentErrorCode::DuplicateStage,
                format!("stage number {} is defined more than once", stage.number),
            )
        } else {
            (
                ContentErrorCode::NonContiguousStages,
                format!(
                    "stage numbers must run 1..=N without gaps; expected {expected}, found {}",
                    stage.number
                ),
            )
        };
        return Err(ctx.error_at(code, message, *node));
    }

    Ok(stages.into_iter().map(|(stage, _)| stage).collect())
}

struct ParseContext<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl ParseContext<'_, '_> {
    fn parse_stage(&self, node: Node<'_, '_>) -> Result<StageDef, ContentCompileError> {
        let number = self.required_u32(node, "number")?;
        if number == 0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                "stage number must start at 1".to_string(),
                node,
            ));
        }
        let map_file = self.required_attr(node, "map")?;
        if !is_plain_file_name(map_file) {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("map '{map_file}' must be a file name inside the maps directory"),
                node,
            ));
        }

        let mut spawn = None;
        let mut enemies = Vec::new();
        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "Spawn" => {
                    if spawn.is_some() {
                        return Err(self.error_at(
                            ContentErrorCode::DuplicateElement,
                            format!("stage {number} declares <Spawn> more than once"),
                            child,
                        ));
                    }
                    spawn = Some(self.tile_coord(child)?);
                }
                "Enemy" => enemies.push(self.tile_coord(child)?),
                other => {
                    return Err(self.error_at(
                        ContentErrorCode::UnknownElement,
                        format!("unsupported element <{other}> in <Stage>"),
                        child,
                    ))
                }
            }
        }

        let Some(spawn) = spawn else {
            return Err(self.error_at(
                ContentErrorCode::MissingElement,
                format!("stage {number} is missing <Spawn>"),
                node,
            ));
        };

        Ok(StageDef {
            number,
            map_file: map_file.to_string(),
            spawn,
            enemies,
        })
    }

    fn tile_coord(&self, node: Node<'_, '_>) -> Result<TileCoord, ContentCompileError> {
        Ok(TileCoord {
            col: self.required_u32(node, "col")?,
            row: self.required_u32(node, "row")?,
        })
    }

    fn required_attr<'n>(
        &self,
        node: Node<'n, '_>,
        name: &str,
    ) -> Result<&'n str, ContentCompileError> {
        match node.attribute(name).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(self.error_at(
                ContentErrorCode::MissingAttribute,
                format!(
                    "<{}> requires a non-empty '{name}' attribute",
                    node.tag_name().name()
                ),
                node,
            )),
        }
    }

    fn required_u32(&self, node: Node<'_, '_>, name: &str) -> Result<u32, ContentCompileError> {
        let raw = self.required_attr(node, name)?;
        raw.parse::<u32>().map_err(|_| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!(
                    "attribute '{name}' on <{}> must be a non-negative integer, got '{raw}'",
                    node.tag_name().name()
                ),
                node,
            )
        })
    }

    fn error_at(
        &self,
        code: ContentErrorCode,
        message: String,
        node: Node<'_, '_>,
    ) -> ContentCompileError {
        let pos = self.doc.text_pos_at(node.range().start);
        ContentCompileError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compile(raw: &str) -> Result<Vec<StageDef>, ContentCompileError> {
        compile_stage_defs_str(Path::new("stages.xml"), raw)
    }

    #[test]
    fn valid_table_compiles_in_number_order() {
        let stages = compile(
            r#"<Stages>
                <Stage number="2" map="map2.txt">
                    <Spawn col="2" row="4"/>
                    <Enemy col="10" row="7"/>
                    <Enemy col="25" row="7"/>
                </Stage>
                <Stage number="1" map="map.txt">
                    <Spawn col="2" row="5"/>
                    <Enemy col="15" row="7"/>
                </Stage>
            </Stages>"#,
        )
        .expect("compile");

        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].number, 1);
        assert_eq!(stages[0].map_file, "map.txt");
        assert_eq!(stages[0].spawn, TileCoord { col: 2, row: 5 });
        assert_eq!(stages[1].enemies.len(), 2);
        assert_eq!(stages[1].enemies[1], TileCoord { col: 25, row: 7 });
    }

    #[test]
    fn stage_without_enemies_is_allowed() {
        let stages = compile(r#"<Stages><Stage number="1" map="a.txt"><Spawn col="1" row="1"/></Stage></Stages>"#)
            .expect("compile");
        assert!(stages[0].enemies.is_empty());
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = compile(r#"<Stages><Stage number="1" map="a.txt"></Stages>"#).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::XmlMalformed);
        assert!(err.location.is_some());
    }

    #[test]
    fn wrong_root_is_rejected() {
        let err = compile(r#"<Levels/>"#).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidRoot);
    }

    #[test]
    fn unknown_element_reports_line() {
        let err = compile(
            "<Stages>\n<Stage number=\"1\" map=\"a.txt\">\n<Spawn col=\"1\" row=\"1\"/>\n<Coin col=\"3\" row=\"3\"/>\n</Stage>\n</Stages>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownElement);
        assert_eq!(err.location.map(|loc| loc.line), Some(4));
    }

    #[test]
    fn missing_attribute_and_bad_number_are_rejected() {
        let missing = compile(r#"<Stages><Stage number="1"><Spawn col="1" row="1"/></Stage></Stages>"#)
            .expect_err("err");
        assert_eq!(missing.code, ContentErrorCode::MissingAttribute);

        let invalid = compile(r#"<Stages><Stage number="1" map="a.txt"><Spawn col="-1" row="1"/></Stage></Stages>"#)
            .expect_err("err");
        assert_eq!(invalid.code, ContentErrorCode::InvalidValue);
    }

    #[test]
    fn spawn_is_required_once() {
        let missing = compile(r#"<Stages><Stage number="1" map="a.txt"/></Stages>"#).expect_err("err");
        assert_eq!(missing.code, ContentErrorCode::MissingElement);

        let duplicate = compile(
            r#"<Stages><Stage number="1" map="a.txt"><Spawn col="1" row="1"/><Spawn col="2" row="1"/></Stage></Stages>"#,
        )
        .expect_err("err");
        assert_eq!(duplicate.code, ContentErrorCode::DuplicateElement);
    }

    #[test]
    fn duplicate_and_gapped_numbers_are_rejected() {
        let duplicate = compile(
            r#"<Stages>
                <Stage number="1" map="a.txt"><Spawn col="1" row="1"/></Stage>
                <Stage number="1" map="b.txt"><Spawn col="1" row="1"/></Stage>
            </Stages>"#,
        )
        .expect_err("err");
        assert_eq!(duplicate.code, ContentErrorCode::DuplicateStage);

        let gap = compile(
            r#"<Stages>
                <Stage number="1" map="a.txt"><Spawn col="1" row="1"/></Stage>
                <Stage number="3" map="b.txt"><Spawn col="1" row="1"/></Stage>
            </Stages>"#,
        )
        .expect_err("err");
        assert_eq!(gap.code, ContentErrorCode::NonContiguousStages);
    }

    #[test]
    fn largest_stage_number_is_rejected_without_overflow() {
        let error = compile(
            r#"<Stages><Stage number="4294967295" map="a.txt"><Spawn col="1" row="1"/></Stage></Stages>"#,
        )
        .expect_err("err");
        assert_eq!(error.code, ContentErrorCode::NonContiguousStages);
        assert_eq!(error.location.map(|location| location.line), Some(1));
    }

    #[test]
    fn empty_table_and_path_escapes_are_rejected() {
        let empty = compile("<Stages/>").expect_err("err");
        assert_eq!(empty.code, ContentErrorCode::NoStages);

        let escape = compile(r#"<Stages><Stage number="1" map="../secret.txt"><Spawn col="1" row="1"/></Stage></Stages>"#)
            .expect_err("err");
        assert_eq!(escape.code, ContentErrorCode::InvalidValue);
    }

    #[test]
    fn compile_from_file_reads_disk_and_reports_missing_file() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("stages.xml");
        let err = compile_stage_defs(&path).expect_err("missing");
        assert_eq!(err.code, ContentErrorCode::ReadFile);

        fs::write(
            &path,
            r#"<Stages><Stage number="1" map="map.txt"><Spawn col="2" row="5"/></Stage></Stages>"#,
        )
        .expect("write");
        let stages = compile_stage_defs(&path).expect("compile");
        assert_eq!(stages.len(), 1);
        assert_eq!(err.file_path, path);
    }
}
