//! Temas visuais do painel.

use serde::{Deserialize, Serialize};

/// Cor em formato hex string (ex: "#76b900").
/// A conversão para `egui::Color32` é feita no painel.
pub type ColorHex = String;

/// Definição completa de um tema de cores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    // Fundo
    pub bg: ColorHex,
    pub panel: ColorHex,
    pub border: ColorHex,
    // Texto
    pub text: ColorHex,
    pub dim: ColorHex,
    /// Nome da GPU e destaques
    pub accent: ColorHex,
    // Status
    pub success: ColorHex,
    pub warning: ColorHex,
    pub critical: ColorHex,
}

/// Converte uma string hex "#RRGGBB" para tupla (r, g, b).
pub fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return (255, 255, 255); // fallback branco
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
    (r, g, b)
}

/// Tema Escuro (padrão, próximo do estilo Fusion escuro).
pub fn dark_theme() -> Theme {
    Theme {
        name: "dark".into(),
        bg: "#2b2b2b".into(),
        panel: "#353535".into(),
        border: "#444444".into(),
        text: "#e6e6e6".into(),
        dim: "#888888".into(),
        accent: "#76b900".into(),
        success: "#4caf50".into(),
        warning: "#e67e22".into(),
        critical: "#c0392b".into(),
    }
}

/// Tema Claro.
pub fn light_theme() -> Theme {
    Theme {
        name: "light".into(),
        bg: "#f5f5f5".into(),
        panel: "#ffffff".into(),
        border: "#cccccc".into(),
        text: "#333333".into(),
        dim: "#777777".into(),
        accent: "#5a8f00".into(),
        success: "#3d8b40".into(),
        warning: "#cc6a12".into(),
        critical: "#a93226".into(),
    }
}

/// Tema High Contrast (acessibilidade).
pub fn high_contrast_theme() -> Theme {
    Theme {
        name: "high_contrast".into(),
        bg: "#000000".into(),
        panel: "#1a1a1a".into(),
        border: "#ffffff".into(),
        text: "#ffffff".into(),
        dim: "#cccccc".into(),
        accent: "#9aff00".into(),
        success: "#00ff00".into(),
        warning: "#ffff00".into(),
        critical: "#ff0000".into(),
    }
}

/// Retorna tema pelo nome.
pub fn get_theme(name: &str) -> Theme {
    match name.to_lowercase().as_str() {
        "light" => light_theme(),
        "high_contrast" => high_contrast_theme(),
        _ => dark_theme(),
    }
}

/// Nomes de temas disponíveis.
pub fn theme_names() -> Vec<&'static str> {
    vec!["dark", "light", "high_contrast"]
}
