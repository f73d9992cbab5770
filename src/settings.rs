// settings.rs
use serde::{Deserialize, Serialize};
use serde_json;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::user_experience::{handle_back_flag, handle_cancel_flag, handle_quit_flag};
use crate::user_interaction::{
    determine_action_as_number, get_edited_user_json_input, get_user_input,
    get_user_input_level_2, print_insight, print_insight_level_2, print_list_level_2,
};

/// Model used when a preset leaves the model field blank.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OpenAiPreset {
    pub api_key: String,
    pub model: String,
}

#[derive(Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub open_ai_presets: Vec<OpenAiPreset>,
}

pub fn open_settings() -> Result<(), Box<dyn std::error::Error>> {
    loop {
        print_insight("Configure OpenAI Presets");
        let menu_options = vec![
            "add open ai preset",
            "update open ai preset",
            "delete open ai preset",
            "view open ai preset",
        ];
        print_list_level_2(&menu_options);
        let choice = get_user_input("Enter your choice: ").to_lowercase();

        if handle_back_flag(&choice) {
            break;
        }
        let _ = handle_quit_flag(&choice);

        let selected_option = determine_action_as_number(&menu_options, &choice);

        match selected_option {
            Some(1) => {
                add_open_ai_preset()?;
                continue;
            }
            Some(2) => {
                update_open_ai_preset()?;
                continue;
            }
            Some(3) => {
                delete_open_ai_preset()?;
                continue;
            }
            Some(4) => {
                view_open_ai_preset()?;
                continue;
            }
            _ => {
                println!("Invalid option. Please enter a number from 1 to 4.");
                continue; // Ask for the choice again
            }
        }
    }

    Ok(())
}

pub fn manage_open_ai_config_file<F: FnOnce(&mut OpenAiConfig) -> Result<(), Box<dyn Error>>>(
    op: F,
) -> Result<(), Box<dyn Error>> {
    let home_dir = match env::var("HOME") {
        Ok(home) => home,
        Err(_) => match env::var("USERPROFILE") {
            Ok(userprofile) => userprofile,
            Err(_) => {
                eprintln!("Unable to determine user home directory.");
                std::process::exit(1);
            }
        },
    };

    let desktop_path = Path::new(&home_dir).join("Desktop");
    let mut path = desktop_path.join("review_db");

    if !path.exists() {
        println!("Path does not exist, creating directory.");
        fs::create_dir_all(&path)?;
    }
    path.push("open_ai_config.json");

    let mut config = if path.exists() {
        let contents = fs::read_to_string(&path)?;
        if contents.is_empty() {
            OpenAiConfig {
                open_ai_presets: vec![],
            }
        } else {
            serde_json::from_str(&contents)?
        }
    } else {
        OpenAiConfig {
            open_ai_presets: vec![],
        }
    };

    op(&mut config)?;

    let serialized = serde_json::to_string(&config)?;

    fs::write(path, serialized)?;

    Ok(())
}

/// Resolves the API credential and model for the sentiment run. The
/// OPENAI_API_KEY env var wins; the stored preset is the fallback.
pub fn resolve_open_ai_access() -> Result<(String, String), Box<dyn Error>> {
    let mut presets = Vec::new();
    let _ = manage_open_ai_config_file(|config| {
        presets = config.open_ai_presets.clone();
        Ok(())
    });

    let preset_model = presets
        .first()
        .map(|p| p.model.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

    if let Ok(key) = env::var("OPENAI_API_KEY") {
        if !key.trim().is_empty() {
            return Ok((key, preset_model));
        }
    }

    match presets.first() {
        Some(preset) if !preset.api_key.trim().is_empty() => {
            Ok((preset.api_key.clone(), preset_model))
        }
        _ => Err(
            "No OpenAI API key found. Set OPENAI_API_KEY or add a preset via @settings.".into(),
        ),
    }
}

fn add_open_ai_preset() -> Result<(), Box<dyn std::error::Error>> {
    let empty_preset = OpenAiPreset {
        api_key: String::new(),
        model: DEFAULT_OPENAI_MODEL.to_string(),
    };

    let preset_json = serde_json::to_string_pretty(&empty_preset)?;
    let edited_json = get_edited_user_json_input(preset_json);

    if handle_cancel_flag(&edited_json) {
        return Ok(());
    }

    let new_preset: OpenAiPreset = serde_json::from_str(&edited_json)?;

    manage_open_ai_config_file(|config| {
        if config.open_ai_presets.is_empty() {
            config.open_ai_presets.push(new_preset);
        } else {
            config.open_ai_presets[0] = new_preset;
        }
        Ok(())
    })
}

fn update_open_ai_preset() -> Result<(), Box<dyn Error>> {
    manage_open_ai_config_file(|config| {
        if !config.open_ai_presets.is_empty() {
            let preset_json = serde_json::to_string_pretty(&config.open_ai_presets[0])?;
            let edited_json = get_edited_user_json_input(preset_json);

            if handle_cancel_flag(&edited_json) {
                return Ok(());
            }

            config.open_ai_presets[0] = serde_json::from_str(&edited_json)?;
            Ok(())
        } else {
            print_insight("No OpenAI preset found.");
            Err("No OpenAI preset found.".into())
        }
    })
}

fn delete_open_ai_preset() -> Result<(), Box<dyn Error>> {
    let confirmation = get_user_input_level_2("Wipe the stored API key? (y/n): ").to_lowercase();
    if confirmation != "y" {
        return Ok(());
    }

    manage_open_ai_config_file(|config| {
        if !config.open_ai_presets.is_empty() {
            config.open_ai_presets[0].api_key = String::new();
            Ok(())
        } else {
            print_insight("No OpenAI preset found.");
            Err("No OpenAI preset found.".into())
        }
    })
}

pub fn view_open_ai_preset() -> Result<(), Box<dyn std::error::Error>> {
    match manage_open_ai_config_file(|config| {
        if !config.open_ai_presets.is_empty() {
            let message = format!(
                "Current OpenAI API Key: {}, model: {}\n",
                config.open_ai_presets[0].api_key, config.open_ai_presets[0].model
            );
            println!();
            print_insight_level_2(&message);
        } else {
            print_insight_level_2("No OpenAI preset found.");
        }
        Ok(())
    }) {
        Ok(_) => Ok(()),
        Err(_e) => {
            print_insight("No OpenAI preset found.");
            Ok(())
        }
    }
}
