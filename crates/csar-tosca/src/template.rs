//! Service template document model.
//!
//! The template is kept as text. Each parse records byte spans for the
//! pieces that may be edited (dependency edges, the topology insertion
//! point, the import insertion point) and every edit splices text at those
//! spans, so the rest of the document is preserved byte for byte. Elements
//! are matched by local name, whatever prefix binds the TOSCA namespace.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use csar_fs::{CsarPath, NormalizedPath, io};
use csar_meta::Manifest;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;

use crate::{DEPENDS_ON, Error, RR_NAMESPACE, Result, TOSCA_NAMESPACE};

/// Prefix bound to [`RR_NAMESPACE`] on every edge this crate writes.
const RR_PREFIX: &str = "rr";

/// Indentation added per nesting level for inserted elements.
const INDENT_UNIT: &str = "    ";

/// A directed `RR_DependsOn` relationship between two node templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone)]
struct TargetTag {
    range: Range<usize>,
    tag: BytesStart<'static>,
    empty: bool,
}

#[derive(Debug, Clone)]
struct EdgeSpan {
    /// The whole `RelationshipTemplate` including its leading whitespace
    element: Range<usize>,
    target: TargetTag,
}

/// Where new edges go.
#[derive(Debug, Clone)]
enum Anchor {
    /// Before the whitespace preceding `</TopologyTemplate>`
    Topology {
        at: usize,
        prefix: String,
        indent: String,
        needs_break: bool,
    },
    /// A self-closing `<TopologyTemplate/>` to expand
    EmptyTopology {
        range: Range<usize>,
        qname: String,
        prefix: String,
        indent: String,
    },
    /// No topology at all: a new one is created before `</ServiceTemplate>`
    ServiceTemplate {
        at: usize,
        prefix: String,
        indent: String,
        needs_break: bool,
    },
}

#[derive(Debug, Clone)]
struct InsertPoint {
    at: usize,
    prefix: String,
    indent: String,
}

#[derive(Debug, Clone)]
struct Layout {
    edges: Vec<DependencyEdge>,
    spans: Vec<EdgeSpan>,
    by_source: HashMap<String, Vec<usize>>,
    ids: HashSet<String>,
    imports: Vec<String>,
    anchor: Anchor,
    import_point: InsertPoint,
}

/// A service template loaded from a workspace.
#[derive(Debug, Clone)]
pub struct ServiceTemplate {
    path: PathBuf,
    text: String,
    layout: Layout,
}

impl ServiceTemplate {
    /// Read and index the template at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = io::read_text(path)?;
        let template = Self::parse(text, path)?;
        tracing::debug!(
            path = %path.display(),
            edges = template.layout.edges.len(),
            "Loaded service template"
        );
        Ok(template)
    }

    /// Index template text that will be saved to `path`.
    pub fn parse(text: impl Into<String>, path: &Path) -> Result<Self> {
        let text = text.into();
        let layout = scan(&text, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
            layout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// All dependency edges, in document order.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.layout.edges
    }

    /// Edges whose source is `source`, in document order.
    pub fn edges_from(&self, source: &str) -> Vec<&DependencyEdge> {
        self.layout
            .by_source
            .get(source)
            .map(|indices| indices.iter().map(|&i| &self.layout.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Append a new edge, keeping any existing ones.
    pub fn append_edge(&mut self, source: &str, target: &str) -> Result<DependencyEdge> {
        let edge = DependencyEdge {
            id: unique_id(source, target, &self.layout.ids),
            source: source.to_string(),
            target: target.to_string(),
        };

        let (range, fragment) = match self.layout.anchor.clone() {
            Anchor::Topology {
                at,
                prefix,
                indent,
                needs_break,
            } => {
                let child = format!("{indent}{INDENT_UNIT}");
                let mut fragment = format!("\n{child}{}", self.render_edge(&edge, &prefix, &child)?);
                if needs_break {
                    fragment.push_str(&format!("\n{indent}"));
                }
                (at..at, fragment)
            }
            Anchor::EmptyTopology {
                range,
                qname,
                prefix,
                indent,
            } => {
                let child = format!("{indent}{INDENT_UNIT}");
                let open = self.text[range.clone()]
                    .trim_end_matches('>')
                    .trim_end_matches('/')
                    .trim_end();
                let fragment = format!(
                    "{open}>\n{child}{}\n{indent}</{qname}>",
                    self.render_edge(&edge, &prefix, &child)?
                );
                (range, fragment)
            }
            Anchor::ServiceTemplate {
                at,
                prefix,
                indent,
                needs_break,
            } => {
                let topology = format!("{indent}{INDENT_UNIT}");
                let child = format!("{topology}{INDENT_UNIT}");
                let mut fragment = format!(
                    "\n{topology}<{prefix}TopologyTemplate>\n{child}{}\n{topology}</{prefix}TopologyTemplate>",
                    self.render_edge(&edge, &prefix, &child)?
                );
                if needs_break {
                    fragment.push_str(&format!("\n{indent}"));
                }
                (at..at, fragment)
            }
        };

        self.apply(vec![(range, fragment)])?;
        tracing::debug!(id = %edge.id, source, target, "Appended dependency edge");
        Ok(edge)
    }

    /// Point the first edge from `source` at `target` and drop the others.
    ///
    /// Returns `None` when `source` has no outgoing edge.
    pub fn retarget(&mut self, source: &str, target: &str) -> Result<Option<DependencyEdge>> {
        let Some((&first, rest)) = self
            .layout
            .by_source
            .get(source)
            .and_then(|indices| indices.split_first())
        else {
            return Ok(None);
        };

        let span = &self.layout.spans[first];
        let mut edits = vec![(
            span.target.range.clone(),
            self.render_target(&span.target, target)?,
        )];
        edits.extend(
            rest.iter()
                .map(|&i| (self.layout.spans[i].element.clone(), String::new())),
        );
        let edge = DependencyEdge {
            id: self.layout.edges[first].id.clone(),
            source: source.to_string(),
            target: target.to_string(),
        };
        let removed = rest.len();

        self.apply(edits)?;
        tracing::debug!(id = %edge.id, source, target, removed, "Retargeted dependency edge");
        Ok(Some(edge))
    }

    /// Whether a root-level `Import` points at `location`.
    pub fn has_import(&self, location: &str) -> bool {
        self.layout.imports.iter().any(|l| l == location)
    }

    /// Add a root-level `Import` of `location` unless one exists.
    ///
    /// Returns true when the document changed.
    pub fn ensure_import(&mut self, namespace: &str, location: &str) -> Result<bool> {
        if self.has_import(location) {
            return Ok(false);
        }
        let InsertPoint { at, prefix, indent } = self.layout.import_point.clone();

        let name = format!("{prefix}Import");
        let mut import = BytesStart::new(name.as_str());
        import.push_attribute(("importType", TOSCA_NAMESPACE));
        import.push_attribute(("location", location));
        import.push_attribute(("namespace", namespace));
        let fragment = format!("\n{indent}{}", self.serialize(vec![Event::Empty(import)])?);

        self.apply(vec![(at..at, fragment)])?;
        tracing::debug!(location, "Imported relationship definitions");
        Ok(true)
    }

    /// Write the current text back to the template file.
    pub fn save(&self) -> Result<()> {
        io::write_text(&self.path, &self.text)?;
        Ok(())
    }

    fn render_edge(&self, edge: &DependencyEdge, prefix: &str, indent: &str) -> Result<String> {
        let element = format!("{prefix}RelationshipTemplate");
        let rr_type = format!("{RR_PREFIX}:{DEPENDS_ON}");
        let rr_xmlns = format!("xmlns:{RR_PREFIX}");
        let mut start = BytesStart::new(element.as_str());
        start.push_attribute(("id", edge.id.as_str()));
        start.push_attribute(("name", edge.id.as_str()));
        start.push_attribute(("type", rr_type.as_str()));
        start.push_attribute((rr_xmlns.as_str(), RR_NAMESPACE));

        let source_name = format!("{prefix}SourceElement");
        let mut source = BytesStart::new(source_name.as_str());
        source.push_attribute(("ref", edge.source.as_str()));
        let target_name = format!("{prefix}TargetElement");
        let mut target = BytesStart::new(target_name.as_str());
        target.push_attribute(("ref", edge.target.as_str()));

        let inner = format!("\n{indent}{INDENT_UNIT}");
        let outer = format!("\n{indent}");
        self.serialize(vec![
            Event::Start(start),
            Event::Text(BytesText::from_escaped(inner.as_str())),
            Event::Empty(source),
            Event::Text(BytesText::from_escaped(inner.as_str())),
            Event::Empty(target),
            Event::Text(BytesText::from_escaped(outer.as_str())),
            Event::End(BytesEnd::new(element.as_str())),
        ])
    }

    /// Rebuild a `TargetElement` start tag with a new `ref`, keeping its
    /// other attributes as written.
    fn render_target(&self, target: &TargetTag, new_ref: &str) -> Result<String> {
        let name = String::from_utf8_lossy(target.tag.name().as_ref()).into_owned();
        let mut rebuilt = BytesStart::new(name);
        for attr in target.tag.attributes() {
            let attr = attr.map_err(|e| Error::parse(&self.path, e))?;
            if attr.key.as_ref() == b"ref" {
                rebuilt.push_attribute(("ref", new_ref));
            } else {
                rebuilt.push_attribute(attr);
            }
        }
        let event = if target.empty {
            Event::Empty(rebuilt)
        } else {
            Event::Start(rebuilt)
        };
        self.serialize(vec![event])
    }

    fn serialize(&self, events: Vec<Event<'_>>) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for event in events {
            writer
                .write_event(event)
                .map_err(|e| Error::write(&self.path, e))?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| Error::write(&self.path, e))
    }

    /// Splice `edits` into the text and re-index. Ranges must not overlap.
    fn apply(&mut self, mut edits: Vec<(Range<usize>, String)>) -> Result<()> {
        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        for (range, replacement) in edits {
            self.text.replace_range(range, &replacement);
        }
        self.layout = scan(&self.text, &self.path)?;
        Ok(())
    }
}

/// Find the service template of a workspace.
///
/// The manifest's `Entry-Definitions` wins when it names an existing
/// document containing a `ServiceTemplate`; otherwise the definitions
/// folder is searched in file name order.
pub fn locate(workspace: &Path, manifest: &Manifest) -> Result<PathBuf> {
    if let Some(entry) = manifest.entry_definitions() {
        let path = entry.under(workspace);
        if path.is_file() && contains_service_template(&io::read_text(&path)?) {
            return Ok(path);
        }
        tracing::warn!(entry = %entry, "Entry-Definitions does not hold a service template");
    }

    let dir = NormalizedPath::new(CsarPath::DefinitionsDir.as_str()).under(workspace);
    if dir.is_dir() {
        let mut candidates = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| csar_fs::Error::io(&dir, e))? {
            let path = entry.map_err(|e| csar_fs::Error::io(&dir, e))?.path();
            let is_definitions = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "tosca" | "xml"));
            if is_definitions && path.is_file() {
                candidates.push(path);
            }
        }
        candidates.sort();
        for path in candidates {
            if contains_service_template(&io::read_text(&path)?) {
                return Ok(path);
            }
        }
    }

    Err(Error::TemplateNotFound {
        workspace: workspace.to_path_buf(),
    })
}

fn contains_service_template(text: &str) -> bool {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(tag) | Event::Empty(tag))
                if tag.local_name().as_ref() == b"ServiceTemplate" =>
            {
                return true;
            }
            Ok(Event::Eof) | Err(_) => return false,
            Ok(_) => {}
        }
    }
}

struct PendingEdge {
    id: String,
    lead: usize,
    source: Option<String>,
    target: Option<(String, TargetTag)>,
}

/// Open-element context used while scanning: (prefix, indent).
type Context = (String, String);

struct Scanner<'t> {
    text: &'t str,
    path: &'t Path,
    depth: usize,
    root: Option<Context>,
    service: Option<Context>,
    topology: Option<Context>,
    pending: Option<PendingEdge>,
    edges: Vec<DependencyEdge>,
    spans: Vec<EdgeSpan>,
    ids: HashSet<String>,
    imports: Vec<String>,
    anchor: Option<Anchor>,
    last_import_end: Option<usize>,
    first_body_child: Option<usize>,
    root_end: Option<usize>,
}

fn scan(text: &str, path: &Path) -> Result<Layout> {
    let mut reader = Reader::from_str(text);
    let mut scanner = Scanner {
        text,
        path,
        depth: 0,
        root: None,
        service: None,
        topology: None,
        pending: None,
        edges: Vec::new(),
        spans: Vec::new(),
        ids: HashSet::new(),
        imports: Vec::new(),
        anchor: None,
        last_import_end: None,
        first_body_child: None,
        root_end: None,
    };

    loop {
        let event = reader.read_event().map_err(|e| Error::XmlParse {
            path: path.to_path_buf(),
            message: format!("{e} (near byte {})", reader.error_position()),
        })?;
        let end = reader.buffer_position() as usize;
        match event {
            Event::Start(tag) => scanner.open(tag, end, false)?,
            Event::Empty(tag) => scanner.open(tag, end, true)?,
            Event::End(tag) => scanner.close(&tag, end),
            Event::Eof => break,
            _ => {}
        }
    }
    scanner.finish()
}

impl Scanner<'_> {
    fn open(&mut self, tag: BytesStart<'_>, end: usize, empty: bool) -> Result<()> {
        let start = tag_start(self.text, end);
        let lead = leading_whitespace(self.text, start);
        let qname = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
        let local = String::from_utf8_lossy(tag.local_name().as_ref()).into_owned();
        let context = || (prefix_of(&qname), indent_of(self.text, start));

        let id = attribute(&tag, b"id", self.path)?;
        if let Some(id) = &id {
            self.ids.insert(id.clone());
        }

        match (self.depth, local.as_str()) {
            (0, _) => self.root = Some(context()),
            (1, "Import") => {
                if let Some(location) = attribute(&tag, b"location", self.path)? {
                    self.imports.push(location);
                }
                if empty {
                    self.last_import_end = Some(end);
                }
            }
            (1, other) => {
                if self.first_body_child.is_none()
                    && !matches!(other, "Documentation" | "Extensions")
                {
                    self.first_body_child = Some(lead);
                }
                if other == "ServiceTemplate" && !empty && self.service.is_none() {
                    self.service = Some(context());
                }
            }
            (_, "TopologyTemplate") if self.service.is_some() => {
                if !empty {
                    self.topology = Some(context());
                } else if self.anchor.is_none() {
                    let (prefix, indent) = context();
                    self.anchor = Some(Anchor::EmptyTopology {
                        range: start..end,
                        qname: qname.clone(),
                        prefix,
                        indent,
                    });
                }
            }
            (_, "RelationshipTemplate") if self.topology.is_some() && !empty => {
                let rr_type = attribute(&tag, b"type", self.path)?.unwrap_or_default();
                let type_name = rr_type.rsplit([':', '}']).next().unwrap_or_default();
                if type_name == DEPENDS_ON {
                    self.pending = Some(PendingEdge {
                        id: id.unwrap_or_default(),
                        lead,
                        source: None,
                        target: None,
                    });
                }
            }
            (_, "SourceElement") if self.pending.is_some() => {
                let reference = attribute(&tag, b"ref", self.path)?;
                if let Some(pending) = self.pending.as_mut() {
                    pending.source = reference;
                }
            }
            (_, "TargetElement") if self.pending.is_some() => {
                let reference = attribute(&tag, b"ref", self.path)?;
                if let (Some(pending), Some(reference)) = (self.pending.as_mut(), reference) {
                    pending.target = Some((
                        reference,
                        TargetTag {
                            range: start..end,
                            tag: tag.into_owned(),
                            empty,
                        },
                    ));
                }
            }
            _ => {}
        }

        if !empty {
            self.depth += 1;
        }
        Ok(())
    }

    fn close(&mut self, tag: &BytesEnd<'_>, end: usize) {
        self.depth = self.depth.saturating_sub(1);
        let start = tag_start(self.text, end);
        let lead = leading_whitespace(self.text, start);
        let needs_break = lead == start;

        match (self.depth, tag.local_name().as_ref()) {
            (0, _) => self.root_end = Some(lead),
            (1, b"Import") => self.last_import_end = Some(end),
            (_, b"RelationshipTemplate") => {
                if let Some(pending) = self.pending.take() {
                    match (pending.source, pending.target) {
                        (Some(source), Some((target, tag))) => {
                            self.edges.push(DependencyEdge {
                                id: pending.id,
                                source,
                                target,
                            });
                            self.spans.push(EdgeSpan {
                                element: pending.lead..end,
                                target: tag,
                            });
                        }
                        _ => tracing::warn!(
                            id = %pending.id,
                            "Skipping dependency edge without source or target"
                        ),
                    }
                }
            }
            (_, b"TopologyTemplate") => {
                if let Some((prefix, indent)) = self.topology.take()
                    && self.anchor.is_none()
                {
                    self.anchor = Some(Anchor::Topology {
                        at: lead,
                        prefix,
                        indent,
                        needs_break,
                    });
                }
            }
            (1, b"ServiceTemplate") => {
                if let Some((prefix, indent)) = self.service.take()
                    && self.anchor.is_none()
                {
                    self.anchor = Some(Anchor::ServiceTemplate {
                        at: lead,
                        prefix,
                        indent,
                        needs_break,
                    });
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Result<Layout> {
        let malformed = |message: &str| Error::MalformedTemplate {
            path: self.path.to_path_buf(),
            message: message.to_string(),
        };

        let (root_prefix, root_indent) = self
            .root
            .clone()
            .ok_or_else(|| malformed("document has no root element"))?;
        let anchor = self
            .anchor
            .clone()
            .ok_or_else(|| malformed("no ServiceTemplate element"))?;
        let at = self
            .last_import_end
            .or(self.first_body_child)
            .or(self.root_end)
            .ok_or_else(|| malformed("root element is not closed"))?;

        let mut by_source: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, edge) in self.edges.iter().enumerate() {
            by_source.entry(edge.source.clone()).or_default().push(i);
        }

        Ok(Layout {
            edges: self.edges,
            spans: self.spans,
            by_source,
            ids: self.ids,
            imports: self.imports,
            anchor,
            import_point: InsertPoint {
                at,
                prefix: root_prefix,
                indent: format!("{root_indent}{INDENT_UNIT}"),
            },
        })
    }
}

fn attribute(tag: &BytesStart<'_>, key: &[u8], path: &Path) -> Result<Option<String>> {
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| Error::parse(path, e))?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(|e| Error::parse(path, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Byte offset of the `<` opening the tag that ends at `end`.
fn tag_start(text: &str, end: usize) -> usize {
    text[..end].rfind('<').unwrap_or(0)
}

/// Start of the whitespace run directly before `start`.
fn leading_whitespace(text: &str, start: usize) -> usize {
    text[..start]
        .trim_end_matches(|c: char| c.is_ascii_whitespace())
        .len()
}

/// Indentation of the line `start` sits on, if only whitespace precedes it.
fn indent_of(text: &str, start: usize) -> String {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &text[line_start..start];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        prefix.to_string()
    } else {
        String::new()
    }
}

/// `"tosca:"` for `tosca:Import`, empty for an unprefixed name.
fn prefix_of(qname: &str) -> String {
    qname
        .rfind(':')
        .map(|i| qname[..=i].to_string())
        .unwrap_or_default()
}

/// An NCName id derived from the endpoints, suffixed until unused.
fn unique_id(source: &str, target: &str, taken: &HashSet<String>) -> String {
    let base: String = format!("{DEPENDS_ON}_{source}_{target}")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
