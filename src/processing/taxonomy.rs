//! Skill taxonomy extraction and matching
//!
//! Matches canonical skill names against text using a fixed, categorized
//! vocabulary. Matching is exact-substring-with-word-boundaries, not stemmed
//! or fuzzy: the taxonomy already lists common aliases, so precision wins
//! over recall.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Importance of a skill within a job description's phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillImportance {
    Required,
    Preferred,
    Mentioned,
}

/// Fixed, categorized skill vocabulary. Process-wide, read-only, injected
/// into the matcher rather than hidden behind a global so tests can supply a
/// minimal taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTaxonomy {
    pub categories: Vec<SkillCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
}

impl SkillTaxonomy {
    pub fn skill_count(&self) -> usize {
        self.categories.iter().map(|c| c.skills.len()).sum()
    }
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        let cat = |name: &str, skills: &[&str]| SkillCategory {
            name: name.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            categories: vec![
                cat(
                    "programming_languages",
                    &[
                        "Python", "JavaScript", "TypeScript", "Java", "C++", "C#", "C", "Go",
                        "Golang", "Rust", "Ruby", "PHP", "Swift", "Kotlin", "Scala", "R",
                        "MATLAB", "Perl", "Lua", "Haskell", "Elixir", "Clojure", "Dart",
                        "Julia", "Bash", "Shell", "PowerShell",
                    ],
                ),
                cat(
                    "web_frontend",
                    &[
                        "React", "React.js", "ReactJS", "Angular", "Vue", "Vue.js", "VueJS",
                        "Svelte", "Next.js", "NextJS", "Nuxt.js", "Gatsby", "HTML", "HTML5",
                        "CSS", "CSS3", "SASS", "SCSS", "Less", "Tailwind", "TailwindCSS",
                        "Bootstrap", "jQuery", "Webpack", "Vite", "Redux", "MobX", "Zustand",
                    ],
                ),
                cat(
                    "web_backend",
                    &[
                        "Node.js", "NodeJS", "Express", "Express.js", "Fastify", "NestJS",
                        "Django", "Flask", "FastAPI", "Spring", "Spring Boot", "Rails",
                        "Ruby on Rails", "Laravel", "ASP.NET", ".NET Core", "Phoenix", "Gin",
                        "Actix", "Rocket", "Prisma", "SQLAlchemy", "Hibernate",
                    ],
                ),
                cat(
                    "databases",
                    &[
                        "SQL", "MySQL", "PostgreSQL", "Postgres", "MongoDB", "Redis",
                        "Elasticsearch", "SQLite", "Oracle", "SQL Server", "Cassandra",
                        "DynamoDB", "Firebase", "Firestore", "Neo4j", "MariaDB", "InfluxDB",
                        "CockroachDB", "Supabase",
                    ],
                ),
                cat(
                    "cloud_platforms",
                    &[
                        "AWS", "Amazon Web Services", "Azure", "Microsoft Azure", "GCP",
                        "Google Cloud", "Google Cloud Platform", "Heroku", "Vercel",
                        "Netlify", "DigitalOcean", "Cloudflare", "Fly.io",
                    ],
                ),
                cat(
                    "devops_infrastructure",
                    &[
                        "Docker", "Kubernetes", "K8s", "Terraform", "Ansible", "Puppet",
                        "Chef", "Jenkins", "GitHub Actions", "GitLab CI", "CircleCI",
                        "ArgoCD", "Helm", "Istio", "Prometheus", "Grafana", "Logstash",
                        "Kibana", "Datadog", "Splunk", "Nginx", "Apache", "HAProxy",
                    ],
                ),
                cat(
                    "machine_learning",
                    &[
                        "Machine Learning", "Deep Learning", "Neural Networks", "TensorFlow",
                        "PyTorch", "Keras", "Scikit-learn", "sklearn", "XGBoost", "LightGBM",
                        "Pandas", "NumPy", "SciPy", "Matplotlib", "Jupyter", "Hugging Face",
                        "Transformers", "BERT", "GPT", "LLM", "NLP",
                        "Natural Language Processing", "Computer Vision", "OpenCV", "MLOps",
                        "MLflow", "Kubeflow",
                    ],
                ),
                cat(
                    "data_engineering",
                    &[
                        "Data Engineering", "ETL", "Apache Spark", "PySpark", "Hadoop",
                        "Hive", "Kafka", "Apache Kafka", "Airflow", "Apache Airflow", "dbt",
                        "Snowflake", "Redshift", "BigQuery", "Databricks", "Apache Flink",
                        "Kinesis",
                    ],
                ),
                cat(
                    "mobile_development",
                    &[
                        "iOS", "Android", "React Native", "Flutter", "SwiftUI", "Xamarin",
                        "Ionic", "Expo", "Mobile Development",
                    ],
                ),
                cat(
                    "testing",
                    &[
                        "Unit Testing", "Integration Testing", "E2E Testing", "TDD", "BDD",
                        "Jest", "Mocha", "Cypress", "Playwright", "Selenium", "Puppeteer",
                        "pytest", "JUnit", "RSpec", "Vitest",
                    ],
                ),
                cat(
                    "version_control",
                    &["Git", "GitHub", "GitLab", "Bitbucket", "SVN", "Version Control"],
                ),
                cat(
                    "methodologies",
                    &[
                        "Agile", "Scrum", "Kanban", "Lean", "DevOps", "CI/CD",
                        "Continuous Integration", "Continuous Deployment", "Code Review",
                        "Pair Programming",
                    ],
                ),
                cat(
                    "soft_skills",
                    &[
                        "Communication", "Leadership", "Teamwork", "Problem Solving",
                        "Critical Thinking", "Time Management", "Project Management",
                        "Stakeholder Management", "Mentoring", "Technical Writing",
                        "Collaboration", "Adaptability",
                    ],
                ),
                cat(
                    "security",
                    &[
                        "Cybersecurity", "Security", "OAuth", "JWT", "Authentication",
                        "Authorization", "Encryption", "SSL/TLS", "HTTPS",
                        "Penetration Testing", "OWASP", "IAM", "RBAC",
                    ],
                ),
                cat(
                    "api_protocols",
                    &[
                        "REST", "RESTful", "GraphQL", "gRPC", "SOAP", "WebSocket",
                        "WebSockets", "API Design", "OpenAPI", "Swagger", "API Gateway",
                        "Microservices",
                    ],
                ),
            ],
        }
    }
}

/// Spelling variants folded to one canonical identity during deduplication.
/// Keys and values are lowercase.
fn canonical_key(skill: &str) -> String {
    let lower = skill.to_lowercase();
    match lower.as_str() {
        "nodejs" | "node" => "node.js".to_string(),
        "react.js" | "reactjs" => "react".to_string(),
        "vue.js" | "vuejs" => "vue".to_string(),
        "nextjs" => "next.js".to_string(),
        "express.js" | "expressjs" => "express".to_string(),
        "golang" => "go".to_string(),
        "k8s" => "kubernetes".to_string(),
        "postgres" => "postgresql".to_string(),
        "sklearn" => "scikit-learn".to_string(),
        "amazon web services" => "aws".to_string(),
        "microsoft azure" => "azure".to_string(),
        "google cloud platform" | "google cloud" => "gcp".to_string(),
        _ => lower,
    }
}

struct CompiledSkill {
    pattern: Regex,
    display: String,
}

pub struct SkillMatcher {
    taxonomy: SkillTaxonomy,
    compiled: Vec<CompiledSkill>,
    canonical_display: HashMap<String, String>,
}

impl Default for SkillMatcher {
    fn default() -> Self {
        Self::new(SkillTaxonomy::default())
    }
}

impl SkillMatcher {
    pub fn new(taxonomy: SkillTaxonomy) -> Self {
        let mut compiled = Vec::with_capacity(taxonomy.skill_count());
        let mut canonical_display: HashMap<String, String> = HashMap::new();

        for category in &taxonomy.categories {
            for skill in &category.skills {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(skill));
                compiled.push(CompiledSkill {
                    pattern: Regex::new(&pattern).expect("Invalid skill regex"),
                    display: skill.clone(),
                });

                let key = canonical_key(skill);
                // Prefer the canonical spelling as the display form
                if skill.to_lowercase() == key {
                    canonical_display.insert(key, skill.clone());
                } else {
                    canonical_display.entry(key).or_insert_with(|| skill.clone());
                }
            }
        }

        Self {
            taxonomy,
            compiled,
            canonical_display,
        }
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    /// Extract every taxonomy skill present in the text, deduplicated across
    /// case and known spelling variants, sorted for determinism.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.extract_with_section(text, None)
    }

    /// Extract skills from the whole text, additionally scanning a dedicated
    /// skills section when one was detected. The section pass contributes to
    /// the same result set; it does not change weighting.
    pub fn extract_with_section(&self, text: &str, skills_section: Option<&str>) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut found: Vec<String> = Vec::new();

        let mut scan = |haystack: &str| {
            for skill in &self.compiled {
                if skill.pattern.is_match(haystack) {
                    let key = canonical_key(&skill.display);
                    if seen.insert(key.clone()) {
                        let display = self
                            .canonical_display
                            .get(&key)
                            .cloned()
                            .unwrap_or_else(|| skill.display.clone());
                        found.push(display);
                    }
                }
            }
        };

        scan(text);
        if let Some(section) = skills_section {
            scan(section);
        }

        found.sort();
        found
    }

    /// Skills required by the JD but absent from the resume, by
    /// case-insensitive identity, preserving the JD's casing and order.
    pub fn find_missing(&self, resume_skills: &[String], jd_skills: &[String]) -> Vec<String> {
        let resume_set: HashSet<String> =
            resume_skills.iter().map(|s| s.to_lowercase()).collect();

        jd_skills
            .iter()
            .filter(|skill| !resume_set.contains(&skill.to_lowercase()))
            .cloned()
            .collect()
    }

    /// Classify skills into their taxonomy categories; unmatched skills fall
    /// into `other`. First category wins on duplicates.
    pub fn categorize(&self, skills: &[String]) -> BTreeMap<String, Vec<String>> {
        let mut categorized: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for skill in skills {
            let skill_lower = skill.to_lowercase();
            let category = self
                .taxonomy
                .categories
                .iter()
                .find(|c| c.skills.iter().any(|s| s.to_lowercase() == skill_lower))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "other".to_string());

            categorized.entry(category).or_default().push(skill.clone());
        }

        categorized
    }

    /// Category name for one skill, `other` when the taxonomy does not list
    /// it.
    pub fn category_of(&self, skill: &str) -> String {
        let skill_lower = skill.to_lowercase();
        self.taxonomy
            .categories
            .iter()
            .find(|c| c.skills.iter().any(|s| s.to_lowercase() == skill_lower))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "other".to_string())
    }

    /// Classify how the JD phrases a skill: near required/must-have wording,
    /// near preferred/nice-to-have wording, or merely mentioned. Whole-text
    /// co-occurrence bounded by sentence punctuation, not a positional
    /// window. Every known spelling variant of the skill is tried, so a JD
    /// saying "NodeJS is required" still classifies "Node.js".
    pub fn importance(&self, skill: &str, context_text: &str) -> SkillImportance {
        let context = context_text.to_lowercase();
        let variants = self.spelling_variants(skill);

        for escaped in &variants {
            let required = [
                format!(r"(?:required|must have|essential|mandatory)[^.]*{}", escaped),
                format!(r"{}[^.]*(?:required|must|essential)", escaped),
            ];
            for pattern in &required {
                let regex = Regex::new(pattern).expect("Invalid importance regex");
                if regex.is_match(&context) {
                    return SkillImportance::Required;
                }
            }
        }

        for escaped in &variants {
            let preferred = [
                format!(r"(?:preferred|nice to have|bonus|plus)[^.]*{}", escaped),
                format!(r"{}[^.]*(?:preferred|plus|bonus)", escaped),
            ];
            for pattern in &preferred {
                let regex = Regex::new(pattern).expect("Invalid importance regex");
                if regex.is_match(&context) {
                    return SkillImportance::Preferred;
                }
            }
        }

        SkillImportance::Mentioned
    }

    /// Escaped lowercase spellings sharing the skill's canonical identity.
    /// Unknown skills fall back to their own spelling.
    fn spelling_variants(&self, skill: &str) -> Vec<String> {
        let key = canonical_key(skill);
        let mut variants: Vec<String> = self
            .compiled
            .iter()
            .filter(|c| canonical_key(&c.display) == key)
            .map(|c| regex::escape(&c.display.to_lowercase()))
            .collect();

        if variants.is_empty() {
            variants.push(regex::escape(&skill.to_lowercase()));
        }
        variants
    }
}
