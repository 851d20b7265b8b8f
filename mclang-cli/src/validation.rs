use std::path::Path;
use unic_langid::LanguageIdentifier;

/// Validate that the input path is an existing, readable directory
pub fn validate_input_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Input directory does not exist: {}", path.display()));
    }

    if !path.is_dir() {
        return Err(format!("Input path is not a directory: {}", path.display()));
    }

    if std::fs::read_dir(path).is_err() {
        return Err(format!("Cannot read input directory: {}", path.display()));
    }

    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_dir(path: &Path) -> Result<(), String> {
    if path.exists() && !path.is_dir() {
        return Err(format!(
            "Output path exists and is not a directory: {}",
            path.display()
        ));
    }

    if !path.exists() {
        if let Err(e) = std::fs::create_dir_all(path) {
            return Err(format!("Cannot create output directory: {}", e));
        }
    }

    Ok(())
}

/// Validate a Minecraft locale code such as `ru_ru`, `zh_cn` or `lol_us`.
///
/// Minecraft joins language and region with an underscore and writes both in
/// lowercase; the code is checked by parsing its BCP 47 form with unic-langid.
/// Returns the normalized (lowercase, underscore) code.
pub fn validate_language_code(lang: &str) -> Result<String, String> {
    let trimmed = lang.trim();
    if trimmed.is_empty() {
        return Err("Language code cannot be empty".to_string());
    }

    let invalid = || {
        format!(
            "Invalid language code format: {}. Expected a Minecraft locale like ru_ru or zh_cn",
            lang
        )
    };

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid());
    }

    // The language subtag itself must be alphabetic
    let starts_alpha = trimmed
        .split(['_', '-'])
        .next()
        .is_some_and(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_alphabetic()));
    if !starts_alpha {
        return Err(invalid());
    }

    let bcp47 = trimmed.replace('_', "-");
    match bcp47.parse::<LanguageIdentifier>() {
        Ok(_) => Ok(trimmed.replace('-', "_").to_ascii_lowercase()),
        Err(_) => Err(invalid()),
    }
}

/// Validate archive extensions passed with `--ext`
pub fn validate_extensions(extensions: &[String]) -> Result<(), String> {
    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("Invalid archive extension: {:?}", ext));
        }
    }
    Ok(())
}
