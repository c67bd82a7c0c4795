use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

#[derive(Parser, Debug)]
#[command(about = "An animated portfolio page for the terminal")]
pub(crate) struct Args {
    /// ms per frame (lower = faster)
    #[arg(long, default_value_t = 16)]
    pub(crate) ms: u64,

    /// rng seed; defaults to the clock
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// JSON file with the page content
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,

    /// hide the circuit layer
    #[arg(long)]
    pub(crate) no_circuit: bool,

    /// hide the floating shapes
    #[arg(long)]
    pub(crate) no_shapes: bool,

    /// monochrome output
    #[arg(long)]
    pub(crate) no_color: bool,

    /// write tracing output to this file
    #[arg(long, env = "TERMFOLIO_LOG")]
    pub(crate) log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) frame_ms: u64,
    pub(crate) seed: u64,
    pub(crate) circuit: bool,
    pub(crate) shapes: bool,
    pub(crate) color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            seed: 0xC0FFEE_u64,
            circuit: true,
            shapes: true,
            color: true,
        }
    }
}

impl Settings {
    pub(crate) fn from_args(args: &Args) -> Self {
        let seed = args.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(Settings::default().seed)
        });
        Self {
            frame_ms: args.ms.clamp(10, 250),
            seed,
            circuit: !args.no_circuit,
            shapes: !args.no_shapes,
            color: !args.no_color,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Stat {
    pub(crate) label: String,
    pub(crate) target: u32,
    #[serde(default)]
    pub(crate) suffix: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Skill {
    pub(crate) name: String,
    /// Bar fill in percent.
    pub(crate) width: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Fact {
    pub(crate) label: String,
    pub(crate) value: String,
}

/// Everything the page and the hidden shell print.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Profile {
    pub(crate) name: String,
    pub(crate) handle: String,
    pub(crate) title: String,
    pub(crate) roles: Vec<String>,
    pub(crate) about: Vec<String>,
    pub(crate) stats: Vec<Stat>,
    pub(crate) skills: Vec<Skill>,
    pub(crate) stack: Vec<String>,
    pub(crate) projects: Vec<String>,
    pub(crate) contact: Vec<String>,
    pub(crate) facts: Vec<Fact>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Alex Morgan".to_string(),
            handle: "alex".to_string(),
            title: "AI Engineer & Backend Developer".to_string(),
            roles: strings(&[
                "Backend Developer",
                "AI Engineer",
                "LLM Specialist",
                "RAG Pipeline Architect",
                "Multi-Agent Systems Builder",
            ]),
            about: strings(&[
                "Backend Developer and AI Engineer",
                "3+ years of experience in scalable architectures and LLM-driven systems",
                "Expertise: RAG pipelines, Multi-agent systems, LangChain, LangGraph",
            ]),
            stats: vec![
                Stat {
                    label: "Years".to_string(),
                    target: 3,
                    suffix: "+".to_string(),
                },
                Stat {
                    label: "Projects".to_string(),
                    target: 25,
                    suffix: "+".to_string(),
                },
                Stat {
                    label: "Problems solved".to_string(),
                    target: 900,
                    suffix: "+".to_string(),
                },
            ],
            skills: vec![
                Skill {
                    name: "Python".to_string(),
                    width: 95,
                },
                Skill {
                    name: "LangChain / LangGraph".to_string(),
                    width: 90,
                },
                Skill {
                    name: "FastAPI / Django".to_string(),
                    width: 88,
                },
                Skill {
                    name: "PostgreSQL / Redis".to_string(),
                    width: 80,
                },
                Skill {
                    name: "Docker / AWS".to_string(),
                    width: 75,
                },
            ],
            stack: strings(&[
                "Core: Python, JavaScript, C++",
                "AI/ML: LangChain, LangGraph, OpenAI, TensorFlow, PyTorch",
                "Backend: Django, FastAPI, Node.js, Express.js",
                "Databases: PostgreSQL, MongoDB, Redis, ChromaDB",
                "Cloud: AWS, Docker, Celery",
            ]),
            projects: strings(&[
                "Agentic Real-time Scraping System (LangGraph, Celery)",
                "RAG Document Q&A Pipeline (LangChain, ChromaDB)",
                "NLP Chart Generation Tool (OpenAI Fine-tuning)",
                "Conversational AI Agents (Zoom SDK, Twilio)",
                "AI Photo Culling System (FastAPI, OpenCV)",
                "Air Quality Forecasting (GNN, RNN)",
            ]),
            contact: strings(&[
                "Email: alex@example.com",
                "Location: Earth",
                "GitHub: github.com/example",
            ]),
            facts: [
                ("OS", "AI Engineer"),
                ("Role", "Backend Developer"),
                ("Experience", "3+ years"),
                ("Languages", "Python, JS, C++"),
                ("Specialization", "LLM & RAG"),
            ]
            .iter()
            .map(|(label, value)| Fact {
                label: label.to_string(),
                value: value.to_string(),
            })
            .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ProfileSource {
    Flag(PathBuf),
    ConfigDir(PathBuf),
    BuiltIn,
}

pub(crate) fn default_profile_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "termfolio", "Termfolio")
        .map(|p| p.config_dir().join("profile.json"))
}

pub(crate) fn read_profile(path: &Path) -> Result<Profile> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("could not read profile {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("invalid profile {}", path.display()))
}

/// `--profile` wins, then the config dir, then the built-in page.
/// A file that exists but does not parse is an error, never a silent fallback.
pub(crate) fn load_profile(flag: Option<&Path>) -> Result<(Profile, ProfileSource)> {
    if let Some(path) = flag {
        return Ok((read_profile(path)?, ProfileSource::Flag(path.to_path_buf())));
    }
    if let Some(path) = default_profile_path() {
        if path.exists() {
            return Ok((read_profile(&path)?, ProfileSource::ConfigDir(path)));
        }
    }
    Ok((Profile::default(), ProfileSource::BuiltIn))
}
