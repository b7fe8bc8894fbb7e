//! Session tokens: the snapshot as JSON, then URL-safe base64 without padding,
//! so a whole session fits in a query string or a shell variable.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use reharm::SessionSnapshot;

pub fn encode(snapshot: &SessionSnapshot) -> Result<String> {
    let json = serde_json::to_vec(snapshot).context("Failed to serialize session")?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode(token: &str) -> Result<SessionSnapshot> {
    let json = URL_SAFE_NO_PAD
        .decode(token.trim())
        .context("Session token is not URL-safe base64")?;
    serde_json::from_slice(&json).context("Session token does not hold a session")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reharm::{rules, PitchTheory, SequentialIds, Session};

    #[test]
    fn test_token_is_url_safe() {
        let mut session = Session::new(PitchTheory, SequentialIds::new("n"));
        session.choose_key("F#", "minor").unwrap();
        let id = session.add_chord("C#", "7").unwrap();
        session.request_substitution(&id, rules::TRITONE).unwrap();
        let group = session.progression().nodes()[0].id().clone();
        session.select(&group).unwrap();

        let token = encode(&session.snapshot()).unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode(&token).unwrap(), session.snapshot());
    }

    #[test]
    fn test_decode_reads_hand_written_token() {
        let json = r#"{"progression":[{"id":"a","type":"chord","root":"C","name":"maj7"}],"scale":{"note":"C","scale":"major"}}"#;
        let token = URL_SAFE_NO_PAD.encode(json);

        let snapshot = decode(&format!("{token}\n")).unwrap();
        assert_eq!(snapshot.progression.len(), 1);
        assert_eq!(snapshot.scale.unwrap().to_string(), "C major");
        assert!(snapshot.selected.is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not a token!").is_err());
        let empty_group = URL_SAFE_NO_PAD
            .encode(r#"{"progression":[{"id":"g","type":"V-I","children":[]}]}"#);
        assert!(decode(&empty_group).is_err());
    }
}
