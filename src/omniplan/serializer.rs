//! XML encoding of scenarios

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::domain::{Note, Resource, Scenario, Task, UserData};

/// OmniPlan v2 namespace, used for both `xmlns` and `xmlns:opns`
pub const NAMESPACE: &str = "http://www.omnigroup.com/namespace/OmniPlan/v2";

const GRANULARITY: &str = "days";

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("Failed to write plan document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plan document is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

type Result<T> = std::result::Result<T, SerializeError>;

/// Writes the scenario to `sink`
///
/// Any write failure aborts immediately; whatever was already written is
/// left in the sink.
pub fn serialize<W: Write>(sink: W, scenario: &Scenario) -> Result<()> {
    let mut xml = Writer::new_with_indent(sink, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("scenario");
    root.push_attribute(("xmlns", NAMESPACE));
    root.push_attribute(("xmlns:opns", NAMESPACE));
    root.push_attribute(("id", &*xml_chars(&scenario.id)));
    xml.write_event(Event::Start(root))?;

    text_element(&mut xml, "granularity", GRANULARITY)?;
    idref(&mut xml, "top-resource", &scenario.top_resource)?;
    for resource in &scenario.resources {
        write_resource(&mut xml, resource)?;
    }

    idref(&mut xml, "top-task", &scenario.top_task)?;
    for task in &scenario.tasks {
        write_task(&mut xml, task)?;
    }

    write_critical_path(&mut xml)?;

    xml.write_event(Event::End(BytesEnd::new("scenario")))?;

    let sink = xml.get_mut();
    sink.write_all(b"\n")?;
    sink.flush()?;
    Ok(())
}

/// Serializes into an in-memory string
pub fn serialize_to_string(scenario: &Scenario) -> Result<String> {
    let mut buf = Vec::new();
    serialize(&mut buf, scenario)?;
    Ok(String::from_utf8(buf)?)
}

fn write_resource<W: Write>(xml: &mut Writer<W>, resource: &Resource) -> Result<()> {
    let mut start = BytesStart::new("resource");
    start.push_attribute(("id", &*xml_chars(&resource.id)));
    xml.write_event(Event::Start(start))?;

    optional_text(xml, "name", &resource.name)?;
    text_element(xml, "type", resource.kind.as_str())?;
    for child in &resource.children {
        idref(xml, "child-resource", child)?;
    }

    xml.write_event(Event::End(BytesEnd::new("resource")))?;
    Ok(())
}

fn write_task<W: Write>(xml: &mut Writer<W>, task: &Task) -> Result<()> {
    let mut start = BytesStart::new("task");
    start.push_attribute(("id", &*xml_chars(&task.id)));
    xml.write_event(Event::Start(start))?;

    optional_text(xml, "title", &task.title)?;
    optional_text(xml, "type", task.kind.as_str())?;
    if let Some(leveled_start) = &task.leveled_start {
        optional_text(xml, "leveled-start", leveled_start)?;
    }
    if let Some(effort) = task.effort.filter(|e| *e > 0) {
        text_element(xml, "effort", &effort.to_string())?;
    }
    if let Some(recalculate) = &task.recalculate {
        optional_text(xml, "recalculate", recalculate)?;
    }
    // cost is not modelled
    text_element(xml, "static-cost", "0")?;

    for child in &task.children {
        idref(xml, "child-task", child)?;
    }
    write_user_data(xml, &task.user_data)?;
    for prerequisite in &task.prerequisites {
        let mut el = BytesStart::new("prerequisite-task");
        el.push_attribute(("idref", &*xml_chars(&prerequisite.task)));
        if let Some(kind) = prerequisite.kind.as_deref().filter(|k| !k.is_empty()) {
            el.push_attribute(("kind", &*xml_chars(kind)));
        }
        xml.write_event(Event::Empty(el))?;
    }
    for assignment in &task.assignments {
        idref(xml, "assignment", assignment)?;
    }
    if let Some(note) = &task.note {
        write_note(xml, note)?;
    }

    xml.write_event(Event::End(BytesEnd::new("task")))?;
    Ok(())
}

/// Alternating `<key>`/`<string>` pairs; nothing at all when empty
fn write_user_data<W: Write>(xml: &mut Writer<W>, data: &UserData) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    xml.write_event(Event::Start(BytesStart::new("user-data")))?;
    for (key, value) in data.iter() {
        text_element(xml, "key", key)?;
        text_element(xml, "string", value)?;
    }
    xml.write_event(Event::End(BytesEnd::new("user-data")))?;
    Ok(())
}

fn write_note<W: Write>(xml: &mut Writer<W>, note: &Note) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new("note")))?;
    xml.write_event(Event::Start(BytesStart::new("text")))?;
    for paragraph in &note.paragraphs {
        xml.write_event(Event::Start(BytesStart::new("p")))?;
        xml.write_event(Event::Start(BytesStart::new("run")))?;
        text_element(xml, "lit", paragraph)?;
        xml.write_event(Event::End(BytesEnd::new("run")))?;
        xml.write_event(Event::End(BytesEnd::new("p")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("text")))?;
    xml.write_event(Event::End(BytesEnd::new("note")))?;
    Ok(())
}

/// Critical-path highlighting is always off
fn write_critical_path<W: Write>(xml: &mut Writer<W>) -> Result<()> {
    let mut start = BytesStart::new("critical-path");
    start.push_attribute(("root", "-1"));
    start.push_attribute(("enabled", "false"));
    start.push_attribute(("resources", "false"));
    xml.write_event(Event::Start(start))?;

    let mut color = BytesStart::new("color");
    color.push_attribute(("space", "srgb"));
    color.push_attribute(("r", "1"));
    color.push_attribute(("g", "0.5"));
    color.push_attribute(("b", "0.5"));
    xml.write_event(Event::Empty(color))?;

    xml.write_event(Event::End(BytesEnd::new("critical-path")))?;
    Ok(())
}

fn text_element<W: Write>(xml: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(&xml_chars(value))))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn optional_text<W: Write>(xml: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    text_element(xml, name, value)
}

fn idref<W: Write>(xml: &mut Writer<W>, name: &str, id: &str) -> Result<()> {
    let mut el = BytesStart::new(name);
    el.push_attribute(("idref", &*xml_chars(id)));
    xml.write_event(Event::Empty(el))?;
    Ok(())
}

/// Replaces characters outside the XML 1.0 `Char` production with U+FFFD
///
/// Escaping only covers markup; control characters such as U+0001 would
/// still make the document unparseable.
fn xml_chars(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_xml_char) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .chars()
            .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}
