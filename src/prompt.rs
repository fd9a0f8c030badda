use std::sync::OnceLock;

use regex::Regex;

/// Marker that prefixes every instruction line of the prompt.
pub const INPUT_MARKER: &str = "Input-";

static INPUT_LINE: OnceLock<Regex> = OnceLock::new();

/// Who is sending the announcement, to whom, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptContext {
    pub requester: String,
    pub audience: String,
    pub send_date: String,
    pub max_words: u32,
}

impl Default for PromptContext {
    fn default() -> Self {
        Self {
            requester: "secretário escolar".to_owned(),
            audience: "turmas do curso do ensino médio".to_owned(),
            send_date: "01/04/2025".to_owned(),
            max_words: 100,
        }
    }
}

/// Renders the instruction prompt for the given request details.
pub fn build_prompt(context: &PromptContext, details: &str) -> String {
    let prompt = format!(
        "\n\
{INPUT_MARKER}Escreva um comunicado escolar objetivo e claro, com até {max_words} palavras. \n\
{INPUT_MARKER}Solicitante: {requester}.\n\
{INPUT_MARKER}Público-alvo: {audience}.\n\
{INPUT_MARKER}Data de envio: {send_date}.\n\
{INPUT_MARKER}Detalhes: \"{details}\".\n\
{INPUT_MARKER}Apenas retorne o comunicado final. Não inclua instruções ou informações de entrada.\n \" \n",
        max_words = context.max_words,
        requester = context.requester,
        audience = context.audience,
        send_date = context.send_date,
    );
    prompt.trim().to_owned()
}

/// Strips echoed instruction lines from generated text.
///
/// Every `Input-` marker followed by at least one character is removed up to
/// and including the end of its line; the result is trimmed.
pub fn clean_announcement(text: &str) -> String {
    let pattern =
        INPUT_LINE.get_or_init(|| Regex::new(r"Input-.+\n?").expect("input line pattern is valid"));
    pattern.replace_all(text, "").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::{build_prompt, clean_announcement, PromptContext};

    #[test]
    fn prompt_has_one_marked_line_per_instruction() {
        let prompt = build_prompt(&PromptContext::default(), "reunião de pais na sexta");
        let marked = prompt.lines().filter(|line| line.starts_with("Input-")).count();

        assert_eq!(marked, 6);
        assert!(prompt.starts_with("Input-Escreva um comunicado escolar"));
        assert!(prompt.contains("Input-Detalhes: \"reunião de pais na sexta\"."));
        assert!(prompt.contains("até 100 palavras"));
        assert!(prompt.ends_with('"'));
    }

    #[test]
    fn prompt_uses_custom_context() {
        let context = PromptContext {
            requester: "diretora".to_owned(),
            audience: "professores".to_owned(),
            send_date: "10/05/2025".to_owned(),
            max_words: 50,
        };
        let prompt = build_prompt(&context, "x");

        assert!(prompt.contains("Input-Solicitante: diretora."));
        assert!(prompt.contains("Input-Público-alvo: professores."));
        assert!(prompt.contains("Input-Data de envio: 10/05/2025."));
        assert!(prompt.contains("até 50 palavras"));
    }

    #[test]
    fn cleanup_removes_marked_lines_and_whitespace() {
        let generated = "Input-Escreva um comunicado.\nInput-Solicitante: secretário.\n\n  Prezados alunos,\nAs aulas retornam na segunda.  \n";
        assert_eq!(
            clean_announcement(generated),
            "Prezados alunos,\nAs aulas retornam na segunda."
        );
    }

    #[test]
    fn cleanup_of_echoed_prompt_leaves_only_the_body() {
        let prompt = build_prompt(&PromptContext::default(), "feriado");
        let generated = format!("{prompt}\n\nComunicado: não haverá aula no feriado.");
        assert_eq!(
            clean_announcement(&generated),
            "\"\n\nComunicado: não haverá aula no feriado."
        );
    }

    #[test]
    fn cleanup_keeps_text_without_markers() {
        assert_eq!(clean_announcement("  Olá turma!  "), "Olá turma!");
    }

    #[test]
    fn bare_marker_without_content_is_kept() {
        assert_eq!(clean_announcement("Input-\nTexto"), "Input-\nTexto");
    }
}
