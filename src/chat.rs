use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msg {
    pub role: Role,
    pub content: String,
}

impl Msg {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Msg {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Msg::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Msg::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Msg::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let msg = Msg::assistant("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn parses_chat_transcripts() {
        let chat: Vec<Msg> = serde_json::from_str(
            r#"[{"role":"system","content":"be brief"},{"role":"user","content":"hello"}]"#,
        )
        .unwrap();
        assert_eq!(chat, vec![Msg::system("be brief"), Msg::user("hello")]);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let res: Result<Msg, _> = serde_json::from_str(r#"{"role":"tool","content":""}"#);
        assert!(res.is_err());
    }
}
