//! Confirmation interactive avant les actions destructrices
//! (suppression, redémarrage, sauvegarde de JSON invalide).

use parking_lot::Mutex;
use std::io::{self, BufRead, Write};

pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Demande `y/n` sur le terminal ; EOF ou erreur de lecture = refus
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        let stdin = io::stdin();
        ask(message, &mut stdin.lock(), &mut io::stdout())
    }
}

fn ask(message: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    loop {
        if write!(output, "❓ {message} [y/n]: ").and_then(|_| output.flush()).is_err() {
            return false;
        }
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" | "o" | "oui" | "д" | "да" => return true,
            "n" | "no" | "non" | "н" | "нет" => return false,
            _ => {
                let _ = writeln!(output, "Please answer y or n");
            }
        }
    }
}

/// Réponse fixe (`--yes`, tests) ; garde la trace des questions posées
pub struct AutoConfirm {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl AutoConfirm {
    pub fn new(answer: bool) -> Self {
        Self { answer, asked: Mutex::new(Vec::new()) }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

impl Confirm for AutoConfirm {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().push(message.to_string());
        self.answer
    }
}
