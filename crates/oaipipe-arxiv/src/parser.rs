//! OAI-PMH ListRecords payload parsing using quick-xml

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::record::Record;

/// Decoded ListRecords page: records in document order plus the
/// continuation token, if the server sent one.
#[derive(Debug, Default)]
pub struct ListPage {
    pub records: Vec<Record>,
    /// `None` when the element is absent, `Some("")` when present but
    /// empty. Both signal the end of the list.
    pub resumption_token: Option<String>,
}

impl ListPage {
    /// Token to carry into the next request, if the list continues.
    pub fn continuation(&self) -> Option<&str> {
        match self.resumption_token.as_deref() {
            None | Some("") => None,
            Some(token) => Some(token),
        }
    }
}

/// Parse one ListRecords response body.
///
/// A record missing any required field is an error for the whole page;
/// partially decoded pages are never returned.
pub fn parse_list_records(xml: &str) -> Result<ListPage> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = ListPage::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"record" => {
                let record = parse_record(&mut reader)
                    .with_context(|| format!("record {} malformed", page.records.len() + 1))?;
                page.records.push(record);
            }
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"resumptionToken" => {
                let text = reader.read_text(e.name())?;
                page.resumption_token = Some(text.trim().to_string());
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"resumptionToken" => {
                page.resumption_token = Some(String::new());
            }
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"error" => {
                let code = error_code(&e);
                let message = read_text(&mut reader)?;
                check_protocol_error(&code, &message)?;
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"error" => {
                let code = error_code(&e);
                check_protocol_error(&code, "")?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    Ok(page)
}

/// Extract the `code` attribute of an `<error>` element.
fn error_code(e: &quick_xml::events::BytesStart<'_>) -> String {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"code" {
            return String::from_utf8_lossy(&attr.value).to_string();
        }
    }
    String::new()
}

/// Handle an OAI protocol error element.
///
/// `noRecordsMatch` is a legitimate empty result; everything else fails
/// the page.
fn check_protocol_error(code: &str, message: &str) -> Result<()> {
    if code == "noRecordsMatch" {
        log::info!("Server reported no records matching the request");
        Ok(())
    } else {
        bail!("OAI error [{code}]: {message}")
    }
}

/// Parse one `<record>`: identifier, title, abstract, and categories are
/// all required.
fn parse_record(reader: &mut Reader<&[u8]>) -> Result<Record> {
    let mut identifier = None;
    let mut title = None;
    let mut abstract_text = None;
    let mut categories = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"id" => identifier = Some(read_text(reader)?),
                b"title" => title = Some(read_text(reader)?),
                b"abstract" => abstract_text = Some(read_text(reader)?),
                b"categories" => categories = Some(read_text(reader)?),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"record" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let identifier = identifier.context("missing <id>")?;
    let title = title.context("missing <title>")?;
    let abstract_text = abstract_text.context("missing <abstract>")?;
    let categories = categories.context("missing <categories>")?;
    if categories.trim().is_empty() {
        bail!("empty <categories>");
    }

    Ok(Record {
        identifier,
        title,
        abstract_text,
        categories,
    })
}

/// Read text content until the next end tag, unescaping entities and
/// flattening nested inline markup.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::End(_) => break,
            Event::Start(_) => {
                text.push_str(&read_text(reader)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(records: &str, token: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2024-03-01T00:00:00Z</responseDate>
  <request verb="ListRecords">https://export.arxiv.org/oai2</request>
  <ListRecords>
{records}{token}
  </ListRecords>
</OAI-PMH>"#
        )
    }

    fn record(id: &str, title: &str, abstract_text: &str, categories: &str) -> String {
        format!(
            r#"    <record>
      <header>
        <identifier>oai:arXiv.org:{id}</identifier>
        <datestamp>2024-03-01</datestamp>
        <setSpec>cs</setSpec>
      </header>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">
          <id>{id}</id>
          <title>{title}</title>
          <abstract>{abstract_text}</abstract>
          <categories>{categories}</categories>
        </arXiv>
      </metadata>
    </record>
"#
        )
    }

    #[test]
    fn three_records_in_document_order() {
        let xml = page(
            &format!(
                "{}{}{}",
                record("0704.0001", "First", "A.", "cs.AI"),
                record("0704.0002", "Second", "B.", "cs.LG stat.ML"),
                record("0704.0003", "Third", "C.", "math.CO"),
            ),
            "<resumptionToken>1001|abc</resumptionToken>",
        );

        let page = parse_list_records(&xml).unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.records[0].identifier, "0704.0001");
        assert_eq!(page.records[1].identifier, "0704.0002");
        assert_eq!(page.records[2].identifier, "0704.0003");
        assert_eq!(page.continuation(), Some("1001|abc"));
    }

    #[test]
    fn categories_kept_verbatim() {
        let xml = page(
            &record("0704.0002", "T", "A.", "cs.LG stat.ML math.OC"),
            "",
        );
        let page = parse_list_records(&xml).unwrap();
        assert_eq!(page.records[0].categories, "cs.LG stat.ML math.OC");
    }

    #[test]
    fn absent_token_means_done() {
        let xml = page(&record("0704.0001", "T", "A.", "cs.AI"), "");
        let page = parse_list_records(&xml).unwrap();
        assert_eq!(page.resumption_token, None);
        assert_eq!(page.continuation(), None);
    }

    #[test]
    fn empty_token_element_means_done() {
        let xml = page(
            &record("0704.0001", "T", "A.", "cs.AI"),
            "<resumptionToken/>",
        );
        let page = parse_list_records(&xml).unwrap();
        assert_eq!(page.resumption_token, Some(String::new()));
        assert_eq!(page.continuation(), None);
    }

    #[test]
    fn token_with_attributes() {
        let xml = page(
            &record("0704.0001", "T", "A.", "cs.AI"),
            r#"<resumptionToken cursor="0" completeListSize="2400000">2001|def</resumptionToken>"#,
        );
        let page = parse_list_records(&xml).unwrap();
        assert_eq!(page.continuation(), Some("2001|def"));
    }

    #[test]
    fn missing_abstract_is_fatal() {
        let xml = page(
            r#"    <record>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">
          <id>0704.0001</id>
          <title>T</title>
          <categories>cs.AI</categories>
        </arXiv>
      </metadata>
    </record>
"#,
            "",
        );
        let err = parse_list_records(&xml).unwrap_err();
        assert!(format!("{err:#}").contains("abstract"));
    }

    #[test]
    fn empty_categories_is_fatal() {
        let xml = page(&record("0704.0001", "T", "A.", "  "), "");
        assert!(parse_list_records(&xml).is_err());
    }

    #[test]
    fn entities_unescaped() {
        let xml = page(
            &record("0704.0001", "P &amp; NP", "a &lt; b.", "cs.CC"),
            "",
        );
        let page = parse_list_records(&xml).unwrap();
        assert_eq!(page.records[0].title, "P & NP");
        assert_eq!(page.records[0].abstract_text, "a < b.");
    }

    #[test]
    fn empty_page() {
        let xml = page("", "");
        let page = parse_list_records(&xml).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.continuation(), None);
    }

    #[test]
    fn no_records_match_is_empty_result() {
        let xml = r#"<?xml version="1.0"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <error code="noRecordsMatch">no matches for the request</error>
</OAI-PMH>"#;
        let page = parse_list_records(xml).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.continuation(), None);
    }

    #[test]
    fn other_protocol_error_is_fatal() {
        let xml = r#"<?xml version="1.0"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <error code="badResumptionToken">token expired</error>
</OAI-PMH>"#;
        let err = parse_list_records(xml).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("badResumptionToken"));
        assert!(msg.contains("token expired"));
    }

    #[test]
    fn truncated_payload_is_error() {
        let xml = r#"<?xml version="1.0"?><OAI-PMH><ListRecords><record><metadata>"#;
        // quick-xml reports the unclosed elements at EOF
        let result = parse_list_records(xml);
        // Either an explicit XML error or a malformed record; never a panic
        assert!(result.is_err());
    }
}
