//! Libellés localisés de l'interface (ru par défaut, comme le backend GEX)

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::ConsoleError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    Fr,
    En,
}

impl Locale {
    pub fn labels(self) -> &'static Labels {
        match self {
            Locale::Ru => &RU,
            Locale::Fr => &FR,
            Locale::En => &EN,
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "fr" => Ok(Locale::Fr),
            "en" => Ok(Locale::En),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}

/// Table des libellés. Les champs `*_prefix` précèdent un message d'erreur,
/// les `confirm_*` contiennent un paramètre `{name}`, `{service}` ou `{error}`.
#[derive(Debug)]
pub struct Labels {
    pub allow: &'static str,
    pub block: &'static str,
    pub any: &'static str,
    pub enabled: &'static str,
    pub disabled: &'static str,
    pub no_rules: &'static str,
    pub no_files: &'static str,
    pub edit: &'static str,
    pub delete: &'static str,
    pub logs_empty: &'static str,
    pub new_rule_name: &'static str,
    pub new_file_title: &'static str,
    pub editing_prefix: &'static str,
    pub filename_required: &'static str,
    pub config_saved: &'static str,
    pub rule_created: &'static str,
    pub rule_updated: &'static str,
    pub rule_deleted: &'static str,
    pub file_saved: &'static str,
    pub file_deleted: &'static str,
    pub service_restarted: &'static str,
    pub saved_invalid_json: &'static str,
    pub rules_load_error: &'static str,
    pub files_load_error: &'static str,
    pub unknown_error: &'static str,
    pub logs_error_prefix: &'static str,
    pub config_load_prefix: &'static str,
    pub rule_load_prefix: &'static str,
    pub file_load_prefix: &'static str,
    pub invalid_json_prefix: &'static str,
    pub save_error_prefix: &'static str,
    pub delete_error_prefix: &'static str,
    pub error_prefix: &'static str,
    pub confirm_delete_rule: &'static str,
    pub confirm_delete_file: &'static str,
    pub confirm_restart: &'static str,
    pub confirm_save_invalid: &'static str,
}

impl Labels {
    pub fn prefixed(prefix: &str, err: &dyn Display) -> String {
        format!("{prefix}{err}")
    }

    /// Texte d'erreur affichable ; un message serveur vide devient « erreur inconnue »
    pub fn describe(&self, err: &ConsoleError) -> String {
        let text = err.to_string();
        if text.trim().is_empty() {
            self.unknown_error.to_string()
        } else {
            text
        }
    }

    pub fn logs_error(&self, err: &dyn Display) -> String {
        Self::prefixed(self.logs_error_prefix, err)
    }

    pub fn invalid_json(&self, err: &dyn Display) -> String {
        Self::prefixed(self.invalid_json_prefix, err)
    }

    pub fn save_error(&self, err: &dyn Display) -> String {
        Self::prefixed(self.save_error_prefix, err)
    }

    pub fn delete_error(&self, err: &dyn Display) -> String {
        Self::prefixed(self.delete_error_prefix, err)
    }

    pub fn editor_title(&self, name: &str) -> String {
        format!("{}{name}.json", self.editing_prefix)
    }

    pub fn confirm_delete_file(&self, name: &str) -> String {
        self.confirm_delete_file.replace("{name}", name)
    }

    pub fn confirm_restart(&self, service: &str) -> String {
        self.confirm_restart.replace("{service}", service)
    }

    pub fn confirm_save_invalid(&self, err: &dyn Display) -> String {
        self.confirm_save_invalid.replace("{error}", &err.to_string())
    }
}

static RU: Labels = Labels {
    allow: "Разрешить",
    block: "Блокировать",
    any: "Любой",
    enabled: "Включено",
    disabled: "Отключено",
    no_rules: "Нет правил",
    no_files: "Нет файлов правил",
    edit: "Изменить",
    delete: "Удалить",
    logs_empty: "Логи пусты",
    new_rule_name: "Новое правило",
    new_file_title: "Создание нового файла",
    editing_prefix: "Редактирование: ",
    filename_required: "Введите имя файла",
    config_saved: "Конфигурация успешно сохранена",
    rule_created: "Правило создано",
    rule_updated: "Правило обновлено",
    rule_deleted: "Правило удалено",
    file_saved: "Файл успешно сохранен",
    file_deleted: "Файл успешно удален",
    service_restarted: "Служба перезапущена",
    saved_invalid_json: "Файл сохранен, но содержит невалидный JSON",
    rules_load_error: "Ошибка загрузки правил",
    files_load_error: "Ошибка загрузки файлов правил",
    unknown_error: "Неизвестная ошибка",
    logs_error_prefix: "Ошибка загрузки логов: ",
    config_load_prefix: "Ошибка загрузки конфигурации: ",
    rule_load_prefix: "Ошибка загрузки правила: ",
    file_load_prefix: "Ошибка загрузки файла: ",
    invalid_json_prefix: "Некорректный JSON: ",
    save_error_prefix: "Ошибка сохранения: ",
    delete_error_prefix: "Ошибка удаления: ",
    error_prefix: "Ошибка: ",
    confirm_delete_rule: "Вы уверены, что хотите удалить это правило?",
    confirm_delete_file: "Вы уверены, что хотите удалить файл \"{name}.json\"?",
    confirm_restart: "Вы уверены, что хотите перезапустить службу {service}?",
    confirm_save_invalid:
        "Содержимое не является валидным JSON:\n{error}\n\nВы хотите сохранить файл как есть?",
};

static FR: Labels = Labels {
    allow: "Autoriser",
    block: "Bloquer",
    any: "Toutes",
    enabled: "Activée",
    disabled: "Désactivée",
    no_rules: "Aucune règle",
    no_files: "Aucun fichier de règles",
    edit: "Modifier",
    delete: "Supprimer",
    logs_empty: "Logs vides",
    new_rule_name: "Nouvelle règle",
    new_file_title: "Création d'un nouveau fichier",
    editing_prefix: "Édition : ",
    filename_required: "Saisissez un nom de fichier",
    config_saved: "Configuration enregistrée",
    rule_created: "Règle créée",
    rule_updated: "Règle mise à jour",
    rule_deleted: "Règle supprimée",
    file_saved: "Fichier enregistré",
    file_deleted: "Fichier supprimé",
    service_restarted: "Service redémarré",
    saved_invalid_json: "Fichier enregistré, mais son contenu n'est pas du JSON valide",
    rules_load_error: "Erreur de chargement des règles",
    files_load_error: "Erreur de chargement des fichiers de règles",
    unknown_error: "Erreur inconnue",
    logs_error_prefix: "Erreur de chargement des logs : ",
    config_load_prefix: "Erreur de chargement de la configuration : ",
    rule_load_prefix: "Erreur de chargement de la règle : ",
    file_load_prefix: "Erreur de chargement du fichier : ",
    invalid_json_prefix: "JSON invalide : ",
    save_error_prefix: "Erreur d'enregistrement : ",
    delete_error_prefix: "Erreur de suppression : ",
    error_prefix: "Erreur : ",
    confirm_delete_rule: "Voulez-vous vraiment supprimer cette règle ?",
    confirm_delete_file: "Voulez-vous vraiment supprimer le fichier \"{name}.json\" ?",
    confirm_restart: "Voulez-vous vraiment redémarrer le service {service} ?",
    confirm_save_invalid:
        "Le contenu n'est pas du JSON valide :\n{error}\n\nEnregistrer le fichier tel quel ?",
};

static EN: Labels = Labels {
    allow: "Allow",
    block: "Block",
    any: "Any",
    enabled: "Enabled",
    disabled: "Disabled",
    no_rules: "No rules",
    no_files: "No rule files",
    edit: "Edit",
    delete: "Delete",
    logs_empty: "Logs are empty",
    new_rule_name: "New rule",
    new_file_title: "Create a new file",
    editing_prefix: "Editing: ",
    filename_required: "Enter a file name",
    config_saved: "Configuration saved",
    rule_created: "Rule created",
    rule_updated: "Rule updated",
    rule_deleted: "Rule deleted",
    file_saved: "File saved",
    file_deleted: "File deleted",
    service_restarted: "Service restarted",
    saved_invalid_json: "File saved, but it contains invalid JSON",
    rules_load_error: "Failed to load rules",
    files_load_error: "Failed to load rule files",
    unknown_error: "Unknown error",
    logs_error_prefix: "Failed to load logs: ",
    config_load_prefix: "Failed to load configuration: ",
    rule_load_prefix: "Failed to load rule: ",
    file_load_prefix: "Failed to load file: ",
    invalid_json_prefix: "Invalid JSON: ",
    save_error_prefix: "Save failed: ",
    delete_error_prefix: "Delete failed: ",
    error_prefix: "Error: ",
    confirm_delete_rule: "Are you sure you want to delete this rule?",
    confirm_delete_file: "Are you sure you want to delete \"{name}.json\"?",
    confirm_restart: "Are you sure you want to restart the {service} service?",
    confirm_save_invalid: "The content is not valid JSON:\n{error}\n\nSave the file as is?",
};
