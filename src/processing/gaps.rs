//! Skill-gap analysis and learning roadmap
//!
//! Deterministic bucketing of the difference between extracted resume skills
//! and a role's required-skill list. Missing skills are tiered by importance
//! and assigned to roadmap phases positionally, not by any optimization.

use crate::processing::taxonomy::SkillMatcher;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_ROLE: &str = "sde";

const MISSING_CAP: usize = 8;
const WEAK_CAP: usize = 4;
const HIGH_ROI_CAP: usize = 5;
const WEAK_SKILL_SAMPLE: usize = 3;
const PHASE_SKILL_CAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportanceTier {
    Critical,
    Important,
    NiceToHave,
}

/// One skill the candidate lacks or should deepen. Levels are on a 0-100
/// proficiency scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    pub name: String,
    pub current_level: u8,
    pub required_level: u8,
    pub importance: ImportanceTier,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub day: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
}

/// 90-day plan in three fixed phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    pub phase1: RoadmapPhase,
    pub phase2: RoadmapPhase,
    pub phase3: RoadmapPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    pub role: String,
    pub current_skills: Vec<String>,
    pub missing_skills: Vec<SkillGap>,
    pub weak_skills: Vec<SkillGap>,
    pub high_roi_skills: Vec<SkillGap>,
    pub roadmap: Roadmap,
}

/// Required and critical skills for one target role. Order matters: roadmap
/// phases take the first matching skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleProfile {
    pub key: String,
    pub required_skills: Vec<String>,
    pub critical_skills: Vec<String>,
}

pub fn default_role_catalog() -> Vec<RoleProfile> {
    let profile = |key: &str, required: &[&str], critical: &[&str]| RoleProfile {
        key: key.to_string(),
        required_skills: required.iter().map(|s| s.to_string()).collect(),
        critical_skills: critical.iter().map(|s| s.to_string()).collect(),
    };

    vec![
        profile(
            "sde",
            &[
                "Python",
                "JavaScript",
                "TypeScript",
                "AWS",
                "System Design",
                "SQL",
                "Git",
                "Docker",
                "REST APIs",
                "Data Structures",
            ],
            &["Python", "JavaScript", "TypeScript", "AWS", "System Design"],
        ),
        profile(
            "frontend",
            &[
                "React",
                "TypeScript",
                "CSS",
                "JavaScript",
                "Next.js",
                "HTML",
                "Redux",
                "Testing",
                "Webpack",
                "Accessibility",
            ],
            &["React", "TypeScript", "CSS", "JavaScript", "Next.js"],
        ),
        profile(
            "backend",
            &[
                "Node.js",
                "Python",
                "SQL",
                "AWS",
                "Docker",
                "PostgreSQL",
                "Redis",
                "REST APIs",
                "Microservices",
                "Message Queues",
            ],
            &["Node.js", "Python", "SQL", "AWS", "Docker"],
        ),
        profile(
            "devops",
            &[
                "Docker",
                "Kubernetes",
                "AWS",
                "CI/CD",
                "Terraform",
                "Linux",
                "Ansible",
                "Prometheus",
                "Bash",
                "Networking",
            ],
            &["Docker", "Kubernetes", "AWS", "CI/CD", "Terraform"],
        ),
        profile(
            "ml-engineer",
            &[
                "Python",
                "TensorFlow",
                "PyTorch",
                "SQL",
                "AWS",
                "Pandas",
                "NumPy",
                "Scikit-learn",
                "MLOps",
                "Statistics",
            ],
            &["Python", "TensorFlow", "PyTorch", "SQL", "AWS"],
        ),
    ]
}

pub struct GapAnalyzer {
    catalog: Vec<RoleProfile>,
    skills: SkillMatcher,
}

impl Default for GapAnalyzer {
    fn default() -> Self {
        Self::new(default_role_catalog())
    }
}

impl GapAnalyzer {
    /// An empty catalog would leave no role to resolve to, so it falls back
    /// to the built-in one.
    pub fn new(catalog: Vec<RoleProfile>) -> Self {
        let catalog = if catalog.is_empty() {
            log::warn!("Empty role catalog, using built-in roles");
            default_role_catalog()
        } else {
            catalog
        };
        Self {
            catalog,
            skills: SkillMatcher::default(),
        }
    }

    pub fn known_roles(&self) -> Vec<&str> {
        self.catalog.iter().map(|p| p.key.as_str()).collect()
    }

    /// Bucket the gap between the candidate's skills and the role's required
    /// list. Unknown role keys fall back to the default role.
    pub fn analyze(&self, current_skills: &[String], role: &str) -> GapReport {
        let profile = self.resolve_role(role);
        let current_lower: HashSet<String> =
            current_skills.iter().map(|s| s.to_lowercase()).collect();

        let mut missing_skills = Vec::new();
        let mut high_roi_skills = Vec::new();

        for skill in &profile.required_skills {
            if current_lower.contains(&skill.to_lowercase()) {
                continue;
            }
            let gap = SkillGap {
                name: skill.clone(),
                current_level: 0,
                required_level: 80,
                importance: self.tier(skill, profile),
                category: self.skills.category_of(skill),
            };
            if gap.importance == ImportanceTier::Critical {
                high_roi_skills.push(gap.clone());
            }
            missing_skills.push(gap);
        }

        // Skills the candidate already shows are assumed present but shallow
        let weak_skills: Vec<SkillGap> = current_skills
            .iter()
            .take(WEAK_SKILL_SAMPLE)
            .map(|skill| SkillGap {
                name: skill.clone(),
                current_level: 50,
                required_level: 80,
                importance: ImportanceTier::Important,
                category: self.skills.category_of(skill),
            })
            .collect();

        let roadmap = build_roadmap(&missing_skills);

        missing_skills.truncate(MISSING_CAP);
        high_roi_skills.truncate(HIGH_ROI_CAP);

        GapReport {
            role: profile.key.clone(),
            current_skills: current_skills.to_vec(),
            missing_skills,
            weak_skills: weak_skills.into_iter().take(WEAK_CAP).collect(),
            high_roi_skills,
            roadmap,
        }
    }

    fn resolve_role<'a>(&'a self, role: &str) -> &'a RoleProfile {
        self.catalog
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(role))
            .unwrap_or_else(|| {
                log::debug!("Unknown role '{}', falling back to '{}'", role, DEFAULT_ROLE);
                // Constructor guarantees a non-empty catalog
                self.catalog
                    .iter()
                    .find(|p| p.key == DEFAULT_ROLE)
                    .unwrap_or(&self.catalog[0])
            })
    }

    fn tier(&self, skill: &str, profile: &RoleProfile) -> ImportanceTier {
        if profile
            .critical_skills
            .iter()
            .any(|c| c.eq_ignore_ascii_case(skill))
        {
            return ImportanceTier::Critical;
        }

        let lower = skill.to_lowercase();
        if ["cloud", "api", "database"].iter().any(|s| lower.contains(s)) {
            return ImportanceTier::Important;
        }

        ImportanceTier::NiceToHave
    }
}

fn build_roadmap(missing: &[SkillGap]) -> Roadmap {
    let by_tier = |tier: ImportanceTier| -> Vec<String> {
        missing
            .iter()
            .filter(|g| g.importance == tier)
            .take(PHASE_SKILL_CAP)
            .map(|g| g.name.clone())
            .collect()
    };

    Roadmap {
        phase1: RoadmapPhase {
            day: "Days 1-30".to_string(),
            title: "Foundation Building".to_string(),
            description: "Focus on critical skills that form the foundation of your target role"
                .to_string(),
            skills: by_tier(ImportanceTier::Critical),
        },
        phase2: RoadmapPhase {
            day: "Days 31-60".to_string(),
            title: "Skill Expansion".to_string(),
            description: "Build on your foundation with important complementary skills"
                .to_string(),
            skills: by_tier(ImportanceTier::Important),
        },
        phase3: RoadmapPhase {
            day: "Days 61-90".to_string(),
            title: "Project Building & Mastery".to_string(),
            description: "Apply your skills to real projects and prepare for interviews"
                .to_string(),
            skills: vec![
                "Portfolio Projects".to_string(),
                "System Design".to_string(),
                "Interview Prep".to_string(),
            ],
        },
    }
}
