//! The local appointment file.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <AppointmentList>
//!   <Appointment>
//!     <ID>1</ID>
//!     <Start>637776648000000000</Start>
//!     <End>637776684000000000</End>
//!     <Description>Dentist</Description>
//!     <Reminder>False</Reminder>
//!   </Appointment>
//! </AppointmentList>
//! ```

use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use roxmltree::{Document, Node};
use tracing::debug;

use crate::error::{ApptSyncError, ApptSyncResult};
use crate::event::Appointment;

const ROOT_TAG: &str = "AppointmentList";
const APPOINTMENT_TAG: &str = "Appointment";

/// File used when none of the configured candidates exist.
pub const DEFAULT_APPOINTMENTS_FILE: &str = "Appointments.xml";

pub struct AppointmentFile {
    path: PathBuf,
}

impl AppointmentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AppointmentFile { path: path.into() }
    }

    /// First candidate that exists on disk, or the default file name.
    pub fn resolve(candidates: &[PathBuf]) -> Self {
        let path = candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_APPOINTMENTS_FILE));
        debug!(path = %path.display(), "Using appointment file");
        AppointmentFile::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every appointment in file order.
    pub fn read(&self) -> ApptSyncResult<Vec<Appointment>> {
        let content = std::fs::read_to_string(&self.path)?;
        parse_appointments(&content)
    }

    /// Replace the file contents with `appointments`.
    ///
    /// Written to a sibling temp file first, then renamed over the original.
    pub fn write(&self, appointments: &[Appointment]) -> ApptSyncResult<()> {
        let xml = render_appointments(appointments)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_APPOINTMENTS_FILE.to_string());
        let temp = self.path.with_file_name(file_name + ".tmp");

        std::fs::write(&temp, xml)?;
        std::fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), count = appointments.len(), "Wrote appointment file");
        Ok(())
    }
}

// =============================================================================
// Parsing
// =============================================================================

pub fn parse_appointments(xml: &str) -> ApptSyncResult<Vec<Appointment>> {
    let xml = xml.trim_start_matches('\u{feff}');
    let doc = Document::parse(xml).map_err(|e| ApptSyncError::AppointmentParse(e.to_string()))?;

    // Any root is accepted; only <AppointmentList> is ever written
    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name(APPOINTMENT_TAG))
        .enumerate()
        .map(|(index, node)| parse_appointment(index + 1, node))
        .collect()
}

fn parse_appointment(position: usize, node: Node<'_, '_>) -> ApptSyncResult<Appointment> {
    let required = |tag: &str| {
        child_text(node, tag).ok_or_else(|| {
            ApptSyncError::AppointmentParse(format!("Appointment #{} has no <{}>", position, tag))
        })
    };

    Ok(Appointment {
        id: required("ID")?.trim().to_string(),
        start_ticks: required("Start")?.trim().to_string(),
        end_ticks: required("End")?.trim().to_string(),
        description: child_text(node, "Description").unwrap_or_default().to_string(),
        reminder: child_text(node, "Reminder").is_some_and(|r| r.trim() == "True"),
    })
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .map(|n| n.text().unwrap_or_default())
}

// =============================================================================
// Rendering
// =============================================================================

pub fn render_appointments(appointments: &[Appointment]) -> ApptSyncResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write_event(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_event(&mut writer, Event::Start(BytesStart::new(ROOT_TAG)))?;

    for appointment in appointments {
        write_event(&mut writer, Event::Start(BytesStart::new(APPOINTMENT_TAG)))?;
        write_text_element(&mut writer, "ID", &appointment.id)?;
        write_text_element(&mut writer, "Start", &appointment.start_ticks)?;
        write_text_element(&mut writer, "End", &appointment.end_ticks)?;
        write_text_element(&mut writer, "Description", &appointment.description)?;
        write_text_element(
            &mut writer,
            "Reminder",
            if appointment.reminder { "True" } else { "False" },
        )?;
        write_event(&mut writer, Event::End(BytesEnd::new(APPOINTMENT_TAG)))?;
    }

    write_event(&mut writer, Event::End(BytesEnd::new(ROOT_TAG)))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| ApptSyncError::AppointmentWrite(e.to_string()))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> ApptSyncResult<()> {
    write_event(writer, Event::Start(BytesStart::new(tag)))?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    write_event(writer, Event::End(BytesEnd::new(tag)))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ApptSyncResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ApptSyncError::AppointmentWrite(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<AppointmentList>
  <Appointment>
    <ID>1</ID>
    <Start>637776648000000000</Start>
    <End>637776684000000000</End>
    <Description>Dentist</Description>
    <Reminder>True</Reminder>
  </Appointment>
  <Appointment>
    <ID>2</ID>
    <Start>637777512000000000</Start>
    <End>637777548000000000</End>
    <Description />
    <Reminder>False</Reminder>
  </Appointment>
</AppointmentList>
"#;

    #[test]
    fn test_parse_sample() {
        let appointments = parse_appointments(SAMPLE).unwrap();
        assert_eq!(appointments.len(), 2);

        assert_eq!(appointments[0].id, "1");
        assert_eq!(appointments[0].start_ticks, "637776648000000000");
        assert_eq!(appointments[0].description, "Dentist");
        assert!(appointments[0].reminder);

        assert_eq!(appointments[1].description, "");
        assert!(!appointments[1].reminder);
    }

    #[test]
    fn test_parse_tolerates_byte_order_mark() {
        let with_bom = format!("\u{feff}{}", SAMPLE);
        assert_eq!(parse_appointments(&with_bom).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_rejects_missing_start() {
        let xml = "<AppointmentList><Appointment><ID>1</ID><End>0</End></Appointment></AppointmentList>";
        let err = parse_appointments(xml).unwrap_err();
        assert!(matches!(err, ApptSyncError::AppointmentParse(msg) if msg.contains("<Start>")));
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        assert!(matches!(
            parse_appointments("<AppointmentList><Appointment>"),
            Err(ApptSyncError::AppointmentParse(_))
        ));
    }

    #[test]
    fn test_parse_accepts_any_root() {
        let xml = "<ArrayOfAppointment><Appointment><ID>4</ID><Start>637776648000000000</Start>\
                   <End>637776684000000000</End><Description>Dentist</Description></Appointment>\
                   </ArrayOfAppointment>";
        let appointments = parse_appointments(xml).unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].id, "4");
        assert_eq!(appointments[0].description, "Dentist");

        assert!(parse_appointments("<Calendar/>").unwrap().is_empty());
    }

    #[test]
    fn test_render_layout() {
        let appointments = vec![Appointment::new(1, 637_776_648_000_000_000, 637_776_684_000_000_000, "Dentist & co")];
        let xml = render_appointments(&appointments).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains("<ID>1</ID>"));
        assert!(xml.contains("<Start>637776648000000000</Start>"));
        assert!(xml.contains("<Description>Dentist &amp; co</Description>"));
        assert!(xml.contains("<Reminder>False</Reminder>"));
    }

    #[test]
    fn test_write_then_read_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let file = AppointmentFile::new(dir.path().join("Appointments.xml"));

        let original = parse_appointments(SAMPLE).unwrap();
        file.write(&original).unwrap();

        assert_eq!(file.read().unwrap(), original);
        assert!(!dir.path().join("Appointments.xml.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = AppointmentFile::new(dir.path().join("nope.xml"));
        assert!(matches!(
            file.read(),
            Err(ApptSyncError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_resolve_prefers_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.xml");
        std::fs::write(&present, SAMPLE).unwrap();

        let file = AppointmentFile::resolve(&[dir.path().join("absent.xml"), present.clone()]);
        assert_eq!(file.path(), present);

        let fallback = AppointmentFile::resolve(&[dir.path().join("absent.xml")]);
        assert_eq!(fallback.path(), Path::new(DEFAULT_APPOINTMENTS_FILE));
    }
}
