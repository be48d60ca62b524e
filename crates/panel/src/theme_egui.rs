//! Conversão de temas para `egui::Color32`.

use egui::Color32;
use gpu_control_core::theme::{self, Theme};

/// Tema convertido para tipos egui.
#[derive(Clone)]
pub struct EguiTheme {
    pub name: String,
    pub bg: Color32,
    pub panel: Color32,
    pub border: Color32,
    pub text: Color32,
    pub dim: Color32,
    pub accent: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub critical: Color32,
}

impl EguiTheme {
    /// Converte um [`Theme`] do core para [`EguiTheme`].
    pub fn from_core(t: &Theme) -> Self {
        Self {
            name: t.name.clone(),
            bg: hex_color(&t.bg),
            panel: hex_color(&t.panel),
            border: hex_color(&t.border),
            text: hex_color(&t.text),
            dim: hex_color(&t.dim),
            accent: hex_color(&t.accent),
            success: hex_color(&t.success),
            warning: hex_color(&t.warning),
            critical: hex_color(&t.critical),
        }
    }

    pub fn is_light(&self) -> bool {
        self.name == "light"
    }

    /// Visuals do egui com as cores do tema.
    pub fn visuals(&self) -> egui::Visuals {
        let mut visuals = if self.is_light() {
            egui::Visuals::light()
        } else {
            egui::Visuals::dark()
        };
        visuals.panel_fill = self.bg;
        visuals.window_fill = self.panel;
        visuals.window_stroke = egui::Stroke::new(1.0, self.border);
        visuals.override_text_color = Some(self.text);
        visuals
    }

    /// Botão destrutivo: fundo da borda, `critical` no hover e no clique.
    pub fn danger_button(&self, widgets: &mut egui::style::Widgets) {
        widgets.inactive.weak_bg_fill = self.border;
        widgets.hovered.weak_bg_fill = self.critical;
        widgets.active.weak_bg_fill = self.critical;
    }
}

fn hex_color(hex: &str) -> Color32 {
    let (r, g, b) = theme::hex_to_rgb(hex);
    Color32::from_rgb(r, g, b)
}

/// Carrega todos os temas disponíveis.
pub fn all_themes() -> Vec<EguiTheme> {
    theme::theme_names()
        .iter()
        .map(|name| EguiTheme::from_core(&theme::get_theme(name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_core_themes_are_converted() {
        let names: Vec<_> = all_themes().into_iter().map(|t| t.name).collect();
        assert_eq!(names, theme::theme_names());
    }

    #[test]
    fn danger_button_turns_critical_on_hover() {
        let dark = EguiTheme::from_core(&theme::get_theme("dark"));
        let mut widgets = egui::Visuals::dark().widgets;
        dark.danger_button(&mut widgets);
        assert_eq!(widgets.inactive.weak_bg_fill, dark.border);
        assert_eq!(widgets.hovered.weak_bg_fill, Color32::from_rgb(0xc0, 0x39, 0x2b));
        assert_eq!(widgets.active.weak_bg_fill, dark.critical);
    }
}
