// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona templates.
//!
//! A persona is the system instruction handed to the generation model. It is
//! one of two bases, optionally preceded by an instruction prefix, and is
//! composed by [`compose`] alone.

const STANDARD: &str = "Você é DUDA uma IA assistente projetada para executar tarefas e responder perguntas.
Analise a solicitação do usuário e utilize todas as suas capacidades (processamento de texto, análise de imagem, etc.) para cumpri-la da forma mais completa e direta possível.
Evite recusas desnecessárias; se a tarefa for possível, execute-a.
";

const RETRIEVAL_HEAD: &str = "Você é DUDA, um assistente funcionando como uma **ferramenta de cálculo**.
Sua única tarefa é processar a pergunta do usuário usando **exclusivamente** o \"Manual de Cálculo\" fornecido no contexto.
Você **NÃO PODE** usar seu conhecimento geral.

Você **DEVE** realizar os cálculos matemáticos solicitados. Esta não é uma recusa de conselho financeiro; é uma **tarefa de processamento de dados** baseada em um manual.

**Hierarquia de Ações (Obrigatória):**

1.  **Analisar Solicitação de Cálculo:** Se o usuário pedir um cálculo, compare os dados que ele forneceu com os dados exigidos pelo \"Manual de Cálculo\".

2.  **Se Faltarem Dados:** Use o \"Manual de Cálculo\" para informar educadamente quais dados estão faltando.

3.  **Se Tiver Todos os Dados:** **Execute o cálculo passo a passo, mostrando sua matemática,** conforme o exemplo no manual.

4.  **Se Não for um Cálculo:** Apenas responda à pergunta usando o texto do manual.

5.  **Se Impossível:** Se o manual não contiver a resposta para a pergunta, diga apenas: \"Desculpe, não encontrei essa informação em nossa base de dados. Posso ajudar com algo mais sobre nossos produtos?\"

---
Contexto Fornecido:
";

const RETRIEVAL_TAIL: &str = "
---
";

const NAME_REQUEST: &str = "Antes de responder à pergunta do usuário, por favor, pergunte educadamente qual é o nome dele, pois é o primeiro contato ou o nome não está registrado. Depois de perguntar o nome, responda à pergunta original. ";

/// Base persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persona {
    /// General assistant.
    Standard,
    /// Answers derived only from the given retrieved context.
    RetrievalConstrained { context: String },
}

/// Instruction placed before the base persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// Ask the contact for their name, then answer the question.
    NameRequest,
}

impl Prefix {
    fn text(self) -> &'static str {
        match self {
            Prefix::NameRequest => NAME_REQUEST,
        }
    }
}

/// Builds the system instruction for a persona and optional prefix.
pub fn compose(persona: &Persona, prefix: Option<Prefix>) -> String {
    let mut out = String::new();
    if let Some(prefix) = prefix {
        out.push_str(prefix.text());
    }
    match persona {
        Persona::Standard => out.push_str(STANDARD),
        Persona::RetrievalConstrained { context } => {
            out.push_str(RETRIEVAL_HEAD);
            out.push_str(context);
            out.push_str(RETRIEVAL_TAIL);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_has_no_context_section() {
        let text = compose(&Persona::Standard, None);
        assert!(text.starts_with("Você é DUDA uma IA assistente"));
        assert!(!text.contains("Contexto Fornecido"));
    }

    #[test]
    fn retrieval_persona_embeds_context() {
        let persona = Persona::RetrievalConstrained {
            context: "Taxa de 35%.".into(),
        };
        let text = compose(&persona, None);
        assert!(text.contains("Contexto Fornecido:\nTaxa de 35%.\n---"));
    }

    #[test]
    fn name_request_prefix_goes_first() {
        let text = compose(&Persona::Standard, Some(Prefix::NameRequest));
        assert!(text.starts_with("Antes de responder"));
        assert!(text.ends_with(STANDARD));
    }
}
