//! Supported answer languages and their register profiles.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Languages the assistant can answer in.
///
/// Unrecognised codes fall back to [`Language::English`], the base profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Portuguese,
}

/// Wording and register used for one [`Language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    /// English name of the language, used inside prompts.
    pub name: &'static str,
    /// Register guidance appended to every prompt.
    pub register: &'static str,
    /// Exact sentence the model must use when the document lacks the answer.
    pub not_found: &'static str,
    /// Introduction used when a summary reply omits one.
    pub default_introduction: &'static str,
    /// Answer used when a reply omits `simpleAnswer`.
    pub default_answer: &'static str,
    /// Answer used when the completion service produced no usable text.
    pub answer_unavailable: &'static str,
    /// Introduction of the fixed summary fallback.
    pub fallback_introduction: &'static str,
    /// Key points of the fixed summary fallback.
    pub fallback_key_points: [&'static str; 5],
}

const ENGLISH: LanguageProfile = LanguageProfile {
    name: "English",
    register: "Write in plain English at a 5th to 8th grade reading level. Use short sentences, \
               say \"you\" to the reader, and explain any technical term right away.",
    not_found: "This information is not mentioned in the document.",
    default_introduction: "Here are the most important things to know about this document.",
    default_answer: "I could not find a clear answer to that in the document.",
    answer_unavailable: "I could not create an answer right now. Please try asking again.",
    fallback_introduction: "Your document has been uploaded and is ready for questions.",
    fallback_key_points: [
        "Document has been uploaded and is ready for questions",
        "Ask about specific terms, obligations, or deadlines",
        "All answers will include exact quotes from the document",
        "You can ask questions like \"What are the penalties?\" or \"Can I cancel?\"",
        "Use simple language - the assistant is here to help you understand",
    ],
};

const SPANISH: LanguageProfile = LanguageProfile {
    name: "Spanish",
    register: "Write in plain, everyday Spanish (lectura fácil). Use short sentences, address the \
               reader as \"usted\", and explain any technical term right away.",
    not_found: "Esta información no aparece en el documento.",
    default_introduction:
        "Estas son las cosas más importantes que debe saber sobre este documento.",
    default_answer: "No encontré una respuesta clara a eso en el documento.",
    answer_unavailable: "No pude crear una respuesta en este momento. Intente preguntar de nuevo.",
    fallback_introduction: "Su documento se cargó y está listo para recibir preguntas.",
    fallback_key_points: [
        "El documento se cargó y está listo para preguntas",
        "Pregunte sobre condiciones, obligaciones o fechas límite específicas",
        "Todas las respuestas incluirán citas exactas del documento",
        "Puede preguntar cosas como \"¿Cuáles son las multas?\" o \"¿Puedo cancelar?\"",
        "Use palabras sencillas: el asistente está aquí para ayudarle a entender",
    ],
};

const FRENCH: LanguageProfile = LanguageProfile {
    name: "French",
    register: "Write in plain, everyday French (facile à lire et à comprendre). Use short \
               sentences, address the reader as \"vous\", and explain any technical term \
               right away.",
    not_found: "Cette information n'est pas mentionnée dans le document.",
    default_introduction: "Voici les points les plus importants à connaître sur ce document.",
    default_answer: "Je n'ai pas trouvé de réponse claire à cette question dans le document.",
    answer_unavailable: "Je ne peux pas répondre pour le moment. Veuillez reposer votre question.",
    fallback_introduction: "Votre document a été chargé et il est prêt pour vos questions.",
    fallback_key_points: [
        "Le document a été chargé et il est prêt pour vos questions",
        "Posez des questions sur les conditions, les obligations ou les délais",
        "Chaque réponse citera exactement le document",
        "Vous pouvez demander « Quelles sont les pénalités ? » ou « Puis-je résilier ? »",
        "Utilisez des mots simples : l'assistant est là pour vous aider à comprendre",
    ],
};

const GERMAN: LanguageProfile = LanguageProfile {
    name: "German",
    register: "Write in plain German (Leichte Sprache). Use short sentences, address the reader \
               as \"Sie\", and explain any technical term right away.",
    not_found: "Diese Information steht nicht im Dokument.",
    default_introduction: "Das sind die wichtigsten Punkte in diesem Dokument.",
    default_answer: "Ich habe im Dokument keine klare Antwort darauf gefunden.",
    answer_unavailable: "Ich kann gerade keine Antwort erstellen. Bitte fragen Sie noch einmal.",
    fallback_introduction: "Ihr Dokument wurde hochgeladen und ist bereit für Fragen.",
    fallback_key_points: [
        "Das Dokument wurde hochgeladen und ist bereit für Fragen",
        "Fragen Sie nach Bedingungen, Pflichten oder Fristen",
        "Jede Antwort enthält genaue Zitate aus dem Dokument",
        "Sie können fragen: \"Welche Strafen gibt es?\" oder \"Kann ich kündigen?\"",
        "Nutzen Sie einfache Worte: Der Assistent hilft Ihnen beim Verstehen",
    ],
};

const PORTUGUESE: LanguageProfile = LanguageProfile {
    name: "Portuguese",
    register: "Write in plain, everyday Portuguese (linguagem simples). Use short sentences, \
               address the reader as \"você\", and explain any technical term right away.",
    not_found: "Esta informação não é mencionada no documento.",
    default_introduction: "Estas são as coisas mais importantes para saber sobre este documento.",
    default_answer: "Não encontrei uma resposta clara para isso no documento.",
    answer_unavailable: "Não consegui criar uma resposta agora. Tente perguntar novamente.",
    fallback_introduction: "Seu documento foi enviado e está pronto para perguntas.",
    fallback_key_points: [
        "O documento foi enviado e está pronto para perguntas",
        "Pergunte sobre condições, obrigações ou prazos específicos",
        "Todas as respostas vão incluir citações exatas do documento",
        "Você pode perguntar \"Quais são as multas?\" ou \"Posso cancelar?\"",
        "Use palavras simples: o assistente está aqui para ajudar você a entender",
    ],
};

impl Language {
    /// Every supported language.
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Portuguese,
    ];

    /// Resolve a language code such as `es` or `pt-BR`.
    ///
    /// Only the primary subtag is considered, case-insensitively. Unknown or
    /// empty codes resolve to English.
    pub fn from_code(code: &str) -> Self {
        let primary = code.trim().split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase();
        match primary.as_str() {
            "es" => Language::Spanish,
            "fr" => Language::French,
            "de" => Language::German,
            "pt" => Language::Portuguese,
            _ => Language::English,
        }
    }

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Portuguese => "pt",
        }
    }

    pub fn profile(self) -> &'static LanguageProfile {
        match self {
            Language::English => &ENGLISH,
            Language::Spanish => &SPANISH,
            Language::French => &FRENCH,
            Language::German => &GERMAN,
            Language::Portuguese => &PORTUGUESE,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Language::from_code(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_primary_subtag() {
        assert_eq!(Language::from_code("es"), Language::Spanish);
        assert_eq!(Language::from_code("ES-mx"), Language::Spanish);
        assert_eq!(Language::from_code("pt_BR"), Language::Portuguese);
        assert_eq!(Language::from_code(" fr "), Language::French);
    }

    #[test]
    fn unknown_codes_use_base_profile() {
        assert_eq!(Language::from_code("xx"), Language::English);
        assert_eq!(Language::from_code(""), Language::English);
        assert_eq!(Language::from_code("klingon"), Language::English);
    }

    #[test]
    fn codes_round_trip() {
        for language in Language::ALL {
            assert_eq!(Language::from_code(language.code()), language);
        }
    }

    #[test]
    fn serde_uses_codes_and_tolerates_unknown_values() {
        assert_eq!(serde_json::to_string(&Language::German).unwrap(), "\"de\"");
        let parsed: Language = serde_json::from_str("\"it\"").unwrap();
        assert_eq!(parsed, Language::English);
    }

    #[test]
    fn every_profile_has_complete_fallback() {
        for language in Language::ALL {
            let profile = language.profile();
            assert!(!profile.not_found.is_empty());
            assert!(profile.fallback_key_points.iter().all(|p| !p.is_empty()));
        }
    }
}
