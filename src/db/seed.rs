//! Seeded miniature repertory for tests and demos: a dozen symptoms,
//! eight polychrest remedies, and kent-sourced rubrics with grade rows.
//! Doubles as documentation of the expected reference-data shapes.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{insert_grade, insert_remedy, insert_rubric, insert_symptom};
use crate::db::DatabaseError;
use crate::models::enums::{Potency, RemedyKingdom, SymptomCategory};
use crate::models::{ModalityProfile, Remedy, Rubric, RubricGrade, Symptom};

fn symptom(code: &str, name: &str, category: SymptomCategory, synonyms: &[&str]) -> Symptom {
    Symptom {
        id: Uuid::new_v4(),
        code: code.into(),
        name: name.into(),
        category,
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
    }
}

#[allow(clippy::too_many_arguments)]
fn remedy(
    name: &str,
    kingdom: RemedyKingdom,
    traits: &[&str],
    better: &[&str],
    worse: &[&str],
    indications: &[&str],
    keynotes: &[&str],
    incompatible: &[&str],
    potencies: &[Potency],
) -> Remedy {
    let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
    Remedy {
        id: Uuid::new_v4(),
        name: name.into(),
        kingdom,
        constitution_traits: to_vec(traits),
        modalities: ModalityProfile {
            better: to_vec(better),
            worse: to_vec(worse),
        },
        clinical_indications: to_vec(indications),
        keynotes: to_vec(keynotes),
        incompatible_with: to_vec(incompatible),
        potencies: potencies.to_vec(),
    }
}

fn rubric(chapter: &str, text: &str, linked: &[&str]) -> Rubric {
    Rubric {
        id: Uuid::new_v4(),
        repertory: "kent".into(),
        chapter: chapter.into(),
        text: text.into(),
        linked_symptom_codes: linked.iter().map(|s| s.to_string()).collect(),
    }
}

/// Populate an open database with the reference fixture.
pub fn seed_reference_fixture(conn: &Connection) -> Result<(), DatabaseError> {
    use Potency::*;
    use RemedyKingdom::*;
    use SymptomCategory::*;

    let symptoms = [
        symptom("MEN-ANX-01", "Anxiety", Mental, &["Anxiousness", "Apprehension"]),
        symptom("MEN-IRR-01", "Irritability", Mental, &["Irascibility"]),
        symptom("MEN-FEAR-01", "Fear of death", Mental, &[]),
        symptom("GEN-FEV-01", "High Fever", General, &["Fever", "Pyrexia"]),
        symptom("GEN-REST-01", "Restlessness", General, &[]),
        symptom("GEN-THIRST-01", "Great thirst", General, &["Thirst"]),
        symptom("PAR-HEAD-01", "Throbbing headache", Particular, &["Pulsating headache"]),
        symptom("PAR-THROAT-01", "Sore throat", Particular, &[]),
        symptom("MOD-NIGHT-01", "Night", Modality, &[]),
        symptom("MOD-MOTION-01", "Motion", Modality, &[]),
        symptom("MOD-COLD-01", "Cold air", Modality, &[]),
    ];
    for s in &symptoms {
        insert_symptom(conn, s)?;
    }

    let remedies = [
        remedy(
            "Aconitum Napellus",
            Plant,
            &["sudden onset", "fearful", "restless"],
            &["open air"],
            &["night", "cold dry wind"],
            &["Acute", "Fever", "Panic"],
            &["Fear of death", "Sudden high fever", "Restlessness"],
            &[],
            &[C30, C200, M1],
        ),
        remedy(
            "Belladonna",
            Plant,
            &["plethoric", "excitable"],
            &["rest", "semi-erect posture"],
            &["noise", "light", "jar"],
            &["Acute", "Fever", "Inflammation"],
            &["Throbbing headache", "High fever with red face"],
            &[],
            &[C6, C30, C200],
        ),
        remedy(
            "Bryonia Alba",
            Plant,
            &["irritable", "business-minded"],
            &["pressure", "rest"],
            &["motion", "warmth"],
            &["Fever", "Influenza", "Rheumatism"],
            &["Worse from any motion", "Great thirst for large quantities"],
            &[],
            &[C6, C30, C200, M1],
        ),
        remedy(
            "Nux Vomica",
            Plant,
            &["irritable", "ambitious", "chilly"],
            &["warmth", "rest", "evening"],
            &["morning", "cold air", "stimulants"],
            &["Chronic", "Digestive", "Insomnia"],
            &["Irritability", "Oversensitive to noise and light"],
            &["Zincum Metallicum"],
            &[C6, C30, C200],
        ),
        remedy(
            "Sulphur",
            Mineral,
            &["philosophical", "untidy", "warm-blooded"],
            &["open air", "motion"],
            &["heat", "bathing", "standing"],
            &["Chronic", "Skin", "Eruptions"],
            &["Burning pains", "Heat of soles at night"],
            &[],
            &[C6, C30, C200, M1],
        ),
        remedy(
            "Apis Mellifica",
            Animal,
            &["busy", "jealous"],
            &["cold applications", "open air"],
            &["heat", "touch", "pressure"],
            &["Acute", "Inflammation", "Oedema"],
            &["Stinging pains", "Thirstlessness with oedema"],
            &["Rhus Toxicodendron"],
            &[C6, C30, C200],
        ),
        remedy(
            "Rhus Toxicodendron",
            Plant,
            &["restless", "anxious at night"],
            &["continued motion", "warmth"],
            &["rest", "cold damp", "night"],
            &["Sprains", "Injury", "Rheumatism"],
            &["Restlessness", "Better from continued motion"],
            &["Apis Mellifica"],
            &[C6, C30, C200, M1],
        ),
        remedy(
            "Phosphorus",
            Mineral,
            &["sympathetic", "open", "fearful when alone"],
            &["cold drinks", "sleep"],
            &["dark", "thunderstorms", "being alone"],
            &["Chronic", "Respiratory", "Haemorrhage"],
            &["Desire for cold drinks", "Fears when alone"],
            &["Causticum"],
            &[C30, C200, M1],
        ),
    ];
    for r in &remedies {
        insert_remedy(conn, r)?;
    }
    let remedy_id = |name: &str| {
        remedies
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.id)
            .expect("fixture remedy")
    };

    let rubrics = [
        rubric("Mind", "Mind; anxiety", &["MEN-ANX-01"]),
        rubric("Mind", "Mind; irritability", &["MEN-IRR-01"]),
        rubric("Mind", "Mind; fear; of death", &["MEN-FEAR-01"]),
        rubric("Fever", "Fever; heat; intense", &["GEN-FEV-01"]),
        rubric("Generalities", "Generals; restlessness", &["GEN-REST-01"]),
        rubric("Stomach", "Stomach; thirst; extreme", &["GEN-THIRST-01"]),
        rubric("Head", "Head; pain; throbbing", &["PAR-HEAD-01"]),
        rubric("Throat", "Throat; inflammation", &["PAR-THROAT-01"]),
        rubric("Generalities", "Generals; night; agg.", &["MOD-NIGHT-01"]),
        rubric("Generalities", "Generals; motion; agg.", &["MOD-MOTION-01"]),
        // Text-only rubrics: no explicit links, matched by the fallback ladder
        rubric("Stomach", "Stomach; nausea; morning", &[]),
        rubric("Mind", "Mind; restlessness; anxious", &[]),
    ];
    for r in &rubrics {
        insert_rubric(conn, r)?;
    }
    let rubric_id = |text: &str| {
        rubrics
            .iter()
            .find(|r| r.text == text)
            .map(|r| r.id)
            .expect("fixture rubric")
    };

    let grade_rows: &[(&str, &str, u8)] = &[
        ("Mind; anxiety", "Aconitum Napellus", 4),
        ("Mind; anxiety", "Phosphorus", 3),
        ("Mind; anxiety", "Nux Vomica", 2),
        ("Mind; irritability", "Nux Vomica", 4),
        ("Mind; irritability", "Sulphur", 2),
        ("Mind; irritability", "Bryonia Alba", 2),
        ("Mind; fear; of death", "Aconitum Napellus", 4),
        ("Mind; fear; of death", "Phosphorus", 2),
        ("Fever; heat; intense", "Belladonna", 4),
        ("Fever; heat; intense", "Aconitum Napellus", 3),
        ("Fever; heat; intense", "Bryonia Alba", 2),
        ("Fever; heat; intense", "Sulphur", 1),
        ("Generals; restlessness", "Rhus Toxicodendron", 4),
        ("Generals; restlessness", "Aconitum Napellus", 3),
        ("Generals; restlessness", "Apis Mellifica", 2),
        ("Stomach; thirst; extreme", "Bryonia Alba", 4),
        ("Stomach; thirst; extreme", "Phosphorus", 3),
        ("Head; pain; throbbing", "Belladonna", 4),
        ("Head; pain; throbbing", "Sulphur", 1),
        ("Throat; inflammation", "Belladonna", 3),
        ("Throat; inflammation", "Apis Mellifica", 3),
        ("Generals; night; agg.", "Aconitum Napellus", 2),
        ("Generals; night; agg.", "Rhus Toxicodendron", 2),
        ("Generals; night; agg.", "Sulphur", 1),
        ("Generals; motion; agg.", "Bryonia Alba", 4),
        ("Generals; motion; agg.", "Belladonna", 2),
        ("Stomach; nausea; morning", "Nux Vomica", 3),
        ("Stomach; nausea; morning", "Sulphur", 1),
        ("Mind; restlessness; anxious", "Aconitum Napellus", 3),
        ("Mind; restlessness; anxious", "Rhus Toxicodendron", 3),
    ];
    for (rubric_text, remedy_name, grade) in grade_rows {
        insert_grade(
            conn,
            &RubricGrade {
                rubric_id: rubric_id(rubric_text),
                remedy_id: remedy_id(remedy_name),
                grade: *grade,
                repertory: "kent".into(),
            },
        )?;
    }

    Ok(())
}
