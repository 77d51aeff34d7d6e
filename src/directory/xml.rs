//! speedtest.net legacy XML documents
//!
//! Location: `<settings><client ip=".." lat=".." lon=".." .../>...</settings>`
//! Directory: `<settings><servers><server url=".." lat=".." lon=".." .../>...`

use super::{candidate_from_parts, utf8, DirectoryParser, LocationParser};
use crate::{
    error::Result,
    models::{ClientLocation, GeoPoint, ServerCandidate},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LocationDocument {
    client: ClientElement,
}

#[derive(Debug, Deserialize)]
struct ClientElement {
    #[serde(rename = "@ip")]
    ip: String,
    #[serde(rename = "@lat")]
    lat: String,
    #[serde(rename = "@lon")]
    lon: String,
}

#[derive(Debug, Deserialize)]
struct DirectoryDocument {
    servers: ServerList,
}

#[derive(Debug, Default, Deserialize)]
struct ServerList {
    #[serde(rename = "server", default)]
    entries: Vec<ServerElement>,
}

#[derive(Debug, Deserialize)]
struct ServerElement {
    #[serde(rename = "@url", default)]
    url: Option<String>,
    #[serde(rename = "@lat", default)]
    lat: Option<String>,
    #[serde(rename = "@lon", default)]
    lon: Option<String>,
}

/// Parses `speedtest-config.php`
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlLocationParser;

impl LocationParser for XmlLocationParser {
    fn parse(&self, document: &[u8]) -> Result<ClientLocation> {
        let doc: LocationDocument = quick_xml::de::from_str(utf8(document)?)?;
        let point = GeoPoint::parse(&doc.client.lat, &doc.client.lon)?;
        Ok(ClientLocation {
            ip: doc.client.ip,
            point,
        })
    }
}

/// Parses `speedtest-servers.php`
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlDirectoryParser;

impl DirectoryParser for XmlDirectoryParser {
    fn parse(&self, document: &[u8]) -> Result<Vec<ServerCandidate>> {
        let doc: DirectoryDocument = quick_xml::de::from_str(utf8(document)?)?;
        Ok(doc
            .servers
            .entries
            .iter()
            .filter_map(|s| {
                let lat = s.lat.as_deref()?.trim().parse().ok()?;
                let lon = s.lon.as_deref()?.trim().parse().ok()?;
                candidate_from_parts(s.url.as_deref()?, lat, lon)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings>
  <client ip="198.51.100.23" lat="52.5167" lon="13.4000" isp="Example ISP" isprating="3.7" rating="0" ispdlavg="0" ispulavg="0" loggedin="0" country="DE" />
  <server-config threadcount="4" ignoreids="1,2,3" notonmap="" forcepingid="" preferredserverid=""/>
  <times dl1="5000" dl2="35000" dl3="800000" ul1="1000" ul2="8000" ul3="35000"/>
</settings>"#;

    const SERVERS_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings>
<servers>
<server url="http://speedtest.berlin.example.net:8080/speedtest/upload.php" lat="52.5200" lon="13.4050" name="Berlin" country="Germany" cc="DE" sponsor="Example" id="101" host="speedtest.berlin.example.net:8080" />
<server url="http://st.hamburg.example.org/speedtest/upload.php" lat="53.5511" lon="9.9937" name="Hamburg" country="Germany" cc="DE" sponsor="Example" id="102" host="st.hamburg.example.org:8080" />
<server url="http://broken.example.org/speedtest/upload.php" lat="north" lon="9.9937" name="Broken" id="103" />
</servers>
</settings>"#;

    #[test]
    fn test_parse_client_record() {
        let client = XmlLocationParser.parse(CONFIG_DOC.as_bytes()).unwrap();
        assert_eq!(client.ip, "198.51.100.23");
        assert_eq!(client.point, GeoPoint::new(52.5167, 13.4).unwrap());
    }

    #[test]
    fn test_parse_server_list_skips_unusable_entries() {
        let servers = XmlDirectoryParser.parse(SERVERS_DOC.as_bytes()).unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].url, "http://speedtest.berlin.example.net:8080");
        assert_eq!(servers[1].url, "http://st.hamburg.example.org");
        assert_eq!(servers[1].coordinate, GeoPoint::new(53.5511, 9.9937).unwrap());
    }

    #[test]
    fn test_entry_missing_attribute_is_skipped() {
        let doc = br#"<settings><servers>
            <server url="http://complete.example.net/speedtest/upload.php" lat="1" lon="2"/>
            <server url="http://partial.example.net/speedtest/upload.php" lat="1"/>
            <server lat="3" lon="4"/>
        </servers></settings>"#;
        let servers = XmlDirectoryParser.parse(doc).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].url, "http://complete.example.net");
    }

    #[test]
    fn test_empty_server_list() {
        let servers = XmlDirectoryParser
            .parse(b"<settings><servers></servers></settings>")
            .unwrap();
        assert!(servers.is_empty());
    }

    #[test]
    fn test_missing_client_is_error() {
        let err = XmlLocationParser
            .parse(b"<settings><times dl1=\"1\"/></settings>")
            .unwrap_err();
        assert_eq!(err.category(), "PARSE");
    }

    #[test]
    fn test_bad_client_coordinates_rejected() {
        assert!(XmlLocationParser
            .parse(br#"<settings><client ip="1.2.3.4" lat="NaN" lon="1"/></settings>"#)
            .is_err());
    }

    #[test]
    fn test_not_xml_is_error() {
        assert!(XmlDirectoryParser.parse(b"<html><body>503").is_err());
        assert!(XmlLocationParser.parse(&[0xff, 0xfe, 0x00]).is_err());
    }
}
