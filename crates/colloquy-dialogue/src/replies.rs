// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed user-facing strings.

/// Sent when the generation call fails.
pub const APOLOGY: &str = "Desculpe, ocorreu um erro ao contatar a IA.";

/// Sent when a voice note could not be turned into text.
pub const NOT_UNDERSTOOD: &str =
    "Desculpe, não consegui entender o que foi dito no áudio. Pode repetir, por favor?";

/// Acknowledges a newly learned name. No generation call is made.
pub fn name_acknowledgement(name: &str) -> String {
    format!("Obrigado, {name}! Guardei o seu nome. Em que mais posso ajudar?")
}

/// Prepended once to the first reply of a contact whose push name was usable.
pub fn welcome(name: &str, reply: &str) -> String {
    format!("Olá, {name}! Vi que é seu primeiro contato. Respondendo à sua pergunta:\n\n{reply}")
}

/// How a transcribed voice note is stored in the dialogue history.
pub fn transcribed(text: &str) -> String {
    format!("[Áudio transcrito]: {text}")
}
