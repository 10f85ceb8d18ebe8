use anyhow::Result;
use tokio::sync::Mutex;

use crate::services::LanguageService;
use crate::types::{Language, UserId};

pub async fn list_languages(
    languages: &Mutex<LanguageService>,
    force_refresh: bool,
) -> Result<Vec<Language>> {
    let mut service = languages.lock().await;
    Ok(service.list_languages(force_refresh)?)
}

pub async fn add_language(
    languages: &Mutex<LanguageService>,
    name: &str,
    added_by: Option<UserId>,
) -> Result<Language> {
    let mut service = languages.lock().await;
    Ok(service.add_language(name, added_by)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_added_language_is_listed() {
        let temp_dir = TempDir::new().unwrap();
        let languages = Mutex::new(LanguageService::new(temp_dir.path()).unwrap());

        assert!(list_languages(&languages, false).await.unwrap().is_empty());
        add_language(&languages, "Elixir", None).await.unwrap();

        let listed = list_languages(&languages, false).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filter_value(), "elixir");

        let duplicate = add_language(&languages, "Elixir", None).await;
        assert!(duplicate.unwrap_err().to_string().contains("already exists"));
    }
}
