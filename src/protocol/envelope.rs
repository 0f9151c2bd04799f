//! SOAP request construction and response parsing

use crate::auth::Token;
use crate::core::{LaunchpadError, LaunchpadResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex::Regex;

const ACTION: &str =
    "http://www.microsoft.com/SoftwareDistribution/Server/ClientWebService/GetExtendedUpdateInfo2";

const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";

const DEVICE_ATTRIBUTES: &str = "E:BranchReadinessLevel=CBB&amp;CurrentBranch=rs_prerelease\
&amp;OEMModel=Virtual Machine&amp;FlightRing=Retail&amp;AttrDataVer=21\
&amp;InstallLanguage=en-US&amp;OSUILocale=en-US&amp;InstallationType=Client\
&amp;FlightingBranchName=&amp;OSSkuId=48&amp;App=WU&amp;AppVer=10.0.22621.1\
&amp;OSArchitecture=AMD64&amp;IsFlightingEnabled=0&amp;TelemEnabled=1\
&amp;DeviceFamily=Windows.Desktop&amp;OSVersion=10.0.22621.1";

/// Fragment types requested for each update
const INFO_TYPES: [&str; 5] = [
    "FileUrl",
    "FileDecryption",
    "EsrpDecryptionInformation",
    "PiecesHashUrl",
    "BlockMapUrl",
];

/// Inputs of one download-location request
pub struct DownloadRequest<'a> {
    pub endpoint: &'a str,
    pub update_id: &'a str,
    pub revision: &'a str,
    pub token: Option<&'a Token>,
    pub message_id: &'a str,
    pub now: DateTime<Utc>,
}

/// Build the `GetExtendedUpdateInfo2` envelope
pub fn build_download_request(request: &DownloadRequest<'_>) -> String {
    let created = request.now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let expires =
        (request.now + Duration::minutes(5)).to_rfc3339_opts(SecondsFormat::Millis, true);

    let tickets = match request.token {
        Some(token) => format!(
            "<TicketType Name=\"MSA\" Version=\"1.0\" Policy=\"MBI_SSL\"><User>{}</User></TicketType>",
            escape(token.as_str())
        ),
        None => String::new(),
    };

    let info_types: String = INFO_TYPES
        .iter()
        .map(|t| format!("<XmlUpdateFragmentType>{}</XmlUpdateFragmentType>", t))
        .collect();

    format!(
        concat!(
            "<s:Envelope xmlns:a=\"http://www.w3.org/2005/08/addressing\" ",
            "xmlns:s=\"http://www.w3.org/2003/05/soap-envelope\">",
            "<s:Header>",
            "<a:Action s:mustUnderstand=\"1\">{action}</a:Action>",
            "<a:MessageID>urn:uuid:{message_id}</a:MessageID>",
            "<a:To s:mustUnderstand=\"1\">{endpoint}</a:To>",
            "<o:Security s:mustUnderstand=\"1\" xmlns:o=\"{wsse}\">",
            "<Timestamp xmlns=\"{wsu}\"><Created>{created}</Created><Expires>{expires}</Expires></Timestamp>",
            "<wuws:WindowsUpdateTicketsToken wsu:id=\"ClientMSA\" xmlns:wsu=\"{wsu}\" ",
            "xmlns:wuws=\"http://schemas.microsoft.com/msus/2014/10/WindowsUpdateAuthorization\">",
            "{tickets}",
            "<TicketType Name=\"AAD\" Version=\"1.0\" Policy=\"MBI_SSL\"></TicketType>",
            "</wuws:WindowsUpdateTicketsToken>",
            "</o:Security>",
            "</s:Header>",
            "<s:Body>",
            "<GetExtendedUpdateInfo2 xmlns=\"http://www.microsoft.com/SoftwareDistribution/Server/ClientWebService\">",
            "<updateIDs><UpdateIdentity><UpdateID>{update_id}</UpdateID>",
            "<RevisionNumber>{revision}</RevisionNumber></UpdateIdentity></updateIDs>",
            "<infoTypes>{info_types}</infoTypes>",
            "<deviceAttributes>{device}</deviceAttributes>",
            "</GetExtendedUpdateInfo2>",
            "</s:Body>",
            "</s:Envelope>"
        ),
        action = ACTION,
        message_id = escape(request.message_id),
        endpoint = escape(request.endpoint),
        wsse = WSSE_NS,
        wsu = WSU_NS,
        created = created,
        expires = expires,
        tickets = tickets,
        update_id = escape(request.update_id),
        revision = escape(request.revision),
        info_types = info_types,
        device = DEVICE_ATTRIBUTES,
    )
}

/// Every `<Url>` in the response, unescaped, in document order
pub fn extract_download_urls(response: &str) -> LaunchpadResult<Vec<String>> {
    let re = Regex::new(r"<(?:\w+:)?Url>\s*([^<]*?)\s*</(?:\w+:)?Url>")
        .map_err(|e| LaunchpadError::Package(format!("Invalid regex: {}", e)))?;

    Ok(re
        .captures_iter(response)
        .map(|cap| unescape(&cap[1]))
        .filter(|url| !url.is_empty())
        .collect())
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request<'a>(token: Option<&'a Token>) -> DownloadRequest<'a> {
        DownloadRequest {
            endpoint: "https://example.com/secured",
            update_id: "abc-123",
            revision: "1",
            token,
            message_id: "00000000-0000-0000-0000-000000000001",
            now: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_request_carries_identity_and_revision() {
        let body = build_download_request(&request(None));
        assert!(body.contains("<UpdateID>abc-123</UpdateID>"));
        assert!(body.contains("<RevisionNumber>1</RevisionNumber>"));
        assert!(body.contains("<a:To s:mustUnderstand=\"1\">https://example.com/secured</a:To>"));
        assert!(body.contains("<Created>2024-01-02T03:04:05.000Z</Created>"));
        assert!(body.contains("<Expires>2024-01-02T03:09:05.000Z</Expires>"));
    }

    #[test]
    fn test_anonymous_request_has_no_msa_ticket() {
        let body = build_download_request(&request(None));
        assert!(!body.contains("Name=\"MSA\""));
        assert!(body.contains("Name=\"AAD\""));
    }

    #[test]
    fn test_authenticated_request_escapes_token() {
        let token = Token::new("t=1&u=<2>");
        let body = build_download_request(&request(Some(&token)));
        assert!(body.contains("<User>t=1&amp;u=&lt;2&gt;</User>"));
    }

    #[test]
    fn test_extract_urls_in_order_and_unescaped() {
        let response = r#"<s:Envelope><s:Body><GetExtendedUpdateInfo2Response>
            <FileLocations>
              <FileLocation><FileDigest>AAA=</FileDigest><Url>http://a.example/1?x=1&amp;y=2</Url></FileLocation>
              <FileLocation><FileDigest>BBB=</FileDigest><Url>http://b.example/2</Url></FileLocation>
            </FileLocations></GetExtendedUpdateInfo2Response></s:Body></s:Envelope>"#;

        let urls = extract_download_urls(response).unwrap();
        assert_eq!(
            urls,
            vec![
                "http://a.example/1?x=1&y=2".to_string(),
                "http://b.example/2".to_string()
            ]
        );
    }

    #[test]
    fn test_extract_urls_from_fault() {
        let fault = "<s:Envelope><s:Body><s:Fault><s:Reason>bad</s:Reason></s:Fault></s:Body></s:Envelope>";
        assert!(extract_download_urls(fault).unwrap().is_empty());
    }

    #[test]
    fn test_escape_unescape() {
        let raw = "a&b<c>\"d'";
        assert_eq!(unescape(&escape(raw)), raw);
    }
}
