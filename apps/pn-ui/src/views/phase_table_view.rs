use egui::{Color32, RichText};
use egui_extras::{Column, TableBuilder};
use pn_app::{EnergyClass, EntryCell, PhaseTable};

fn energy_color(class: EnergyClass) -> Color32 {
    match class {
        EnergyClass::Positive => Color32::from_rgb(0xdc, 0x26, 0x26),
        EnergyClass::Negative => Color32::from_rgb(0x05, 0x96, 0x69),
        EnergyClass::Zero => Color32::GRAY,
    }
}

pub fn show(ui: &mut egui::Ui, table: &PhaseTable) {
    ui.horizontal(|ui| {
        ui.heading("Phase Information");
        ui.label(table.count_label.as_str());
    });
    ui.label(format!("Calculation Details: {}", table.summary()));
    ui.label(format!("Energy Corrections: {}", table.correction_note));
    ui.separator();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(110.0).at_least(80.0)) // Formula
        .column(Column::initial(130.0).at_least(90.0)) // Composition
        .column(Column::initial(120.0).at_least(90.0)) // Formation energy
        .column(Column::initial(110.0).at_least(90.0)) // Energy per atom
        .column(Column::initial(100.0).at_least(80.0)) // Correction
        .column(Column::remainder().at_least(120.0)) // Entry
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("Formula");
            });
            header.col(|ui| {
                ui.strong("Composition");
            });
            header.col(|ui| {
                ui.strong("E_form (eV/atom)");
            });
            header.col(|ui| {
                ui.strong("E (eV/atom)");
            });
            header.col(|ui| {
                ui.strong("Correction");
            });
            header.col(|ui| {
                ui.strong("Materials Project ID");
            });
        })
        .body(|mut body| {
            for row in &table.rows {
                body.row(24.0, |mut cells| {
                    cells.col(|ui| {
                        ui.strong(row.formula.as_str());
                    });
                    cells.col(|ui| {
                        ui.label(row.composition.as_str());
                    });
                    cells.col(|ui| {
                        ui.label(
                            RichText::new(row.formation_energy.as_str())
                                .monospace()
                                .color(energy_color(row.energy_class)),
                        );
                    });
                    cells.col(|ui| {
                        ui.monospace(row.energy_per_atom.as_str());
                    });
                    cells.col(|ui| {
                        ui.monospace(row.correction.as_str())
                            .on_hover_text(row.correction_tooltip);
                    });
                    cells.col(|ui| match &row.entry {
                        EntryCell::Link(link) => {
                            ui.hyperlink_to(link.clean_id.as_str(), &link.url)
                                .on_hover_text(link.title.as_str());
                            if !link.suffix.is_empty() {
                                ui.weak(link.suffix.as_str());
                            }
                        }
                        EntryCell::Plain(text) => {
                            ui.label(text.as_str());
                        }
                    });
                });
            }
        });
}
