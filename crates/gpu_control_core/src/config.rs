//! Preferências persistidas em `~/.config/gpu-control.conf`.
//!
//! O arquivo é uma lista plana `chave=valor`:
//!
//! ```text
//! power=350
//! memory=1000
//! core=150
//! startup=1
//! ```
//!
//! Esse formato já é TOML válido, então é lido e escrito com `toml`.
//! Chaves ausentes não alteram os controles.

use crate::types::{CORE_OFFSET_RANGE, GpuSettings, MEMORY_OFFSET_RANGE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Erros ao salvar a configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("não foi possível criar {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("não foi possível escrever {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("erro de serialização: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Conteúdo do arquivo de configuração.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Limite de potência (W)
    pub power: Option<i32>,
    /// Offset de memória (MHz)
    pub memory: Option<i32>,
    /// Offset de core (MHz)
    pub core: Option<i32>,
    /// Aplicar no boot (`1`/`0`)
    #[serde(with = "flag")]
    pub startup: Option<bool>,
    /// Tema: "dark", "light", "high_contrast"
    pub theme: Option<String>,
}

impl AppConfig {
    /// Carrega o arquivo; ausente ou inválido resulta na configuração padrão.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Salva a configuração, criando `~/.config` se necessário.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Monta a configuração a partir dos controles do painel.
    pub fn from_settings(settings: &GpuSettings, theme: &str) -> Self {
        Self {
            power: Some(settings.power_limit),
            memory: Some(settings.memory_offset),
            core: Some(settings.core_offset),
            startup: Some(settings.apply_on_startup),
            theme: Some(theme.to_string()),
        }
    }

    /// Copia para os controles apenas as chaves presentes no arquivo.
    pub fn apply_to(&self, settings: &mut GpuSettings) {
        if let Some(v) = self.power {
            settings.power_limit = v;
        }
        if let Some(v) = self.memory {
            settings.memory_offset = v;
        }
        if let Some(v) = self.core {
            settings.core_offset = v;
        }
        if let Some(v) = self.startup {
            settings.apply_on_startup = v;
        }
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(p) = self.power.filter(|p| *p < 0) {
            errors.push(format!("Limite de potência negativo: {p}"));
        }
        if let Some(m) = self.memory.filter(|m| !MEMORY_OFFSET_RANGE.contains(m)) {
            errors.push(format!(
                "Offset de memória fora da faixa: {m} ({}–{})",
                MEMORY_OFFSET_RANGE.start(),
                MEMORY_OFFSET_RANGE.end()
            ));
        }
        if let Some(c) = self.core.filter(|c| !CORE_OFFSET_RANGE.contains(c)) {
            errors.push(format!(
                "Offset de core fora da faixa: {c} ({}–{})",
                CORE_OFFSET_RANGE.start(),
                CORE_OFFSET_RANGE.end()
            ));
        }

        errors
    }
}

/// `startup` é gravado como `1`/`0`; `true`/`false` também é aceito.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    pub fn serialize<S: Serializer>(value: &Option<bool>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_i64(i64::from(*v)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Option::<Raw>::deserialize(d)?.map(|raw| match raw {
            Raw::Bool(b) => b,
            Raw::Int(i) => i == 1,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_key_value_file() {
        let config = AppConfig::parse("power=350\nmemory=1000\ncore=-30\nstartup=1\n").unwrap();
        assert_eq!(config.power, Some(350));
        assert_eq!(config.memory, Some(1000));
        assert_eq!(config.core, Some(-30));
        assert_eq!(config.startup, Some(true));
        assert_eq!(config.theme, None);
    }

    #[test]
    fn startup_accepts_bool_and_zero() {
        assert_eq!(AppConfig::parse("startup=0").unwrap().startup, Some(false));
        assert_eq!(AppConfig::parse("startup = true").unwrap().startup, Some(true));
        assert_eq!(AppConfig::parse("startup=2").unwrap().startup, Some(false));
    }

    #[test]
    fn missing_keys_leave_controls_untouched() {
        let config = AppConfig::parse("core=45").unwrap();
        let mut s = GpuSettings {
            power_limit: 300,
            memory_offset: 500,
            core_offset: 0,
            apply_on_startup: true,
        };
        config.apply_to(&mut s);
        assert_eq!(s.power_limit, 300);
        assert_eq!(s.memory_offset, 500);
        assert_eq!(s.core_offset, 45);
        assert!(s.apply_on_startup);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".config").join("gpu-control.conf");
        let settings = GpuSettings {
            power_limit: 420,
            memory_offset: 1500,
            core_offset: 90,
            apply_on_startup: true,
        };
        AppConfig::from_settings(&settings, "light").save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("startup = 1"), "{text}");

        let loaded = AppConfig::load(&path);
        let mut restored = GpuSettings::default();
        loaded.apply_to(&mut restored);
        assert_eq!(restored, settings);
        assert_eq!(loaded.theme.as_deref(), Some("light"));
    }

    #[test]
    fn garbage_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpu-control.conf");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::load(&dir.path().join("nope.conf")), AppConfig::default());
    }

    #[test]
    fn validate_ranges() {
        assert!(AppConfig::default().validate().is_empty());
        let bad = AppConfig {
            power: Some(-1),
            memory: Some(7000),
            core: Some(-2000),
            ..Default::default()
        };
        assert_eq!(bad.validate().len(), 3);
    }
}
