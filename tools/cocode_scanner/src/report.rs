//! cppcheck-style XML reports.
//!
//! ```xml
//! <results>
//!     <errors>
//!         <error id="CommentedoutCode" severity="style" msg="..." verbose="...">
//!             <location file="src/a.cpp" line="10" column="1" />
//!         </error>
//!     </errors>
//! </results>
//! ```

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::info;
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::{CocodeError, Result};
use crate::models::{Location, PositionIndex};

pub const ERROR_ID: &str = "CommentedoutCode";
pub const SEVERITY: &str = "style";
pub const MESSAGE: &str = "Section of code should not be commented out.";

const INDENT: &str = "    ";

/// A `<location>` entry read back from a report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

/// Write a new report for `index`. Fails without touching anything if `path` exists.
pub fn create(path: &Path, index: &PositionIndex) -> Result<()> {
    if path.exists() {
        return Err(CocodeError::ReportExists(path.to_path_buf()));
    }

    let mut root = Element::new("results");
    root.children.push(XMLNode::Element(Element::new("errors")));
    append_errors(&mut root, index);
    write_report(path, &root)?;

    info!(report = %path.display(), errors = index.len(), "report created");
    Ok(())
}

/// Append the errors for `index` to an existing report, rewriting it in place.
///
/// Every `<errors>` element in the document receives the full set of new
/// entries. Returns how many `<errors>` elements were extended.
pub fn extend(path: &Path, index: &PositionIndex) -> Result<usize> {
    if !path.exists() {
        return Err(CocodeError::ReportMissing(path.to_path_buf()));
    }

    let mut root = parse_report(path)?;
    let sections = append_errors(&mut root, index);
    write_report(path, &root)?;

    info!(report = %path.display(), errors = index.len(), sections, "report extended");
    Ok(sections)
}

/// Every `<location>` of every `<error>` in the report at `path`.
pub fn read_locations(path: &Path) -> Result<Vec<ReportLocation>> {
    let root = parse_report(path)?;
    let mut found = Vec::new();
    collect_locations(&root, &mut found);
    Ok(found)
}

fn parse_report(path: &Path) -> Result<Element> {
    let file = File::open(path).map_err(|e| CocodeError::io(path, e))?;
    Element::parse(BufReader::new(file)).map_err(|e| CocodeError::ReportParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_report(path: &Path, root: &Element) -> Result<()> {
    let config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string(INDENT);
    let mut buf = Vec::new();
    root.write_with_config(&mut buf, config)
        .map_err(|e| CocodeError::ReportWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    buf.push(b'\n');
    fs::write(path, buf).map_err(|e| CocodeError::io(path, e))
}

fn error_element(file: &Path, location: Location) -> Element {
    let mut error = Element::new("error");
    for (key, value) in [
        ("id", ERROR_ID),
        ("severity", SEVERITY),
        ("msg", MESSAGE),
        ("verbose", MESSAGE),
    ] {
        error.attributes.insert(key.to_string(), value.to_string());
    }

    let mut loc = Element::new("location");
    loc.attributes
        .insert("file".to_string(), file.to_string_lossy().to_string());
    loc.attributes
        .insert("line".to_string(), location.line.to_string());
    loc.attributes
        .insert("column".to_string(), location.column.to_string());
    error.children.push(XMLNode::Element(loc));
    error
}

/// Append one `<error>` per indexed position to every `<errors>` element.
fn append_errors(root: &mut Element, index: &PositionIndex) -> usize {
    let errors: Vec<Element> = index
        .positions()
        .map(|(file, location)| error_element(file, location))
        .collect();

    let mut sections = 0;
    for_each_errors(root, &mut |section| {
        section
            .children
            .extend(errors.iter().cloned().map(XMLNode::Element));
        sections += 1;
    });
    sections
}

fn for_each_errors(element: &mut Element, f: &mut impl FnMut(&mut Element)) {
    if element.name == "errors" {
        f(element);
    }
    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            for_each_errors(child, f);
        }
    }
}

fn collect_locations(element: &Element, out: &mut Vec<ReportLocation>) {
    for child in &element.children {
        let XMLNode::Element(child) = child else {
            continue;
        };
        if element.name == "error" && child.name == "location" {
            let attr = |name: &str| child.attributes.get(name).cloned();
            let parsed = (|| {
                Some(ReportLocation {
                    file: attr("file")?,
                    line: attr("line")?.parse().ok()?,
                    column: attr("column")?.parse().ok()?,
                })
            })();
            if let Some(loc) = parsed {
                out.push(loc);
            }
        }
        collect_locations(child, out);
    }
}
