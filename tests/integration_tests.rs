//! Integration tests for the resume matcher pipeline

use resume_matcher::config::Config;
use resume_matcher::output::{ConsoleFormatter, JsonFormatter, MarkdownFormatter};
use resume_matcher::processing::analyzer::MatchEngine;
use resume_matcher::processing::embeddings::HashEmbeddingBackend;
use resume_matcher::processing::taxonomy::SkillImportance;
use std::fs;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn engine() -> MatchEngine {
    MatchEngine::with_backend(&Config::default(), Box::new(HashEmbeddingBackend::new(256)))
}

#[test]
fn test_full_analysis_of_fixture_pair() {
    let resume = fixture("sample_resume.txt");
    let jd = fixture("sample_jd.txt");

    let report = engine().analyze(&resume, &jd, Some("backend")).unwrap();
    let score = &report.analysis.score;

    assert!((0.0..=100.0).contains(&score.overall_score));
    for sub in [
        score.skills_match,
        score.experience_relevance,
        score.keyword_coverage,
        score.role_alignment,
    ] {
        assert!((0.0..=100.0).contains(&sub));
    }

    // Matching content should land well above the floor
    assert!(score.keyword_coverage > 50.0);
    assert!(score.overall_score > 30.0);
}

#[test]
fn test_skill_extraction_and_gap() {
    let resume = fixture("sample_resume.txt");
    let jd = fixture("sample_jd.txt");

    let report = engine().analyze(&resume, &jd, Some("backend")).unwrap();

    for skill in ["Python", "Django", "PostgreSQL", "Docker", "AWS"] {
        assert!(
            report.resume_skills.iter().any(|s| s == skill),
            "expected {} in resume skills {:?}",
            skill,
            report.resume_skills
        );
    }

    // Kubernetes appears only in the JD, phrased as a plus
    let kubernetes = report
        .missing_skills
        .iter()
        .find(|s| s.name == "Kubernetes")
        .expect("Kubernetes should be missing");
    assert_eq!(kubernetes.importance, SkillImportance::Preferred);

    // The backend role requires Node.js, which the resume lacks
    assert!(report
        .gap_report
        .missing_skills
        .iter()
        .any(|g| g.name == "Node.js"));
    // But not skills the candidate already has
    assert!(!report
        .gap_report
        .missing_skills
        .iter()
        .any(|g| g.name.eq_ignore_ascii_case("python")));
}

#[test]
fn test_years_and_title_detected() {
    let resume = fixture("sample_resume.txt");
    let jd = fixture("sample_jd.txt");

    let report = engine().analyze(&resume, &jd, None).unwrap();

    assert_eq!(report.analysis.resume_years_stated, Some(5));
    assert_eq!(report.analysis.jd_years_required, Some(3));
    assert_eq!(
        report.analysis.job_title_detected.as_deref(),
        Some("Senior Backend Engineer")
    );
}

#[test]
fn test_contact_info_extracted() {
    let resume = fixture("sample_resume.txt");
    let jd = fixture("sample_jd.txt");

    let report = engine().analyze(&resume, &jd, None).unwrap();
    assert_eq!(report.contact.email.as_deref(), Some("jane.doe@example.com"));
    assert_eq!(
        report.contact.linkedin.as_deref(),
        Some("linkedin.com/in/jane-doe")
    );
    assert_eq!(report.contact.github.as_deref(), Some("github.com/janedoe"));
}

#[test]
fn test_roadmap_is_deterministic() {
    let resume = fixture("sample_resume.txt");
    let jd = fixture("sample_jd.txt");
    let engine = engine();

    let first = engine.analyze(&resume, &jd, Some("devops")).unwrap();
    let second = engine.analyze(&resume, &jd, Some("devops")).unwrap();

    assert_eq!(
        first.gap_report.roadmap.phase1.skills,
        second.gap_report.roadmap.phase1.skills
    );
    assert_eq!(
        first.analysis.score.overall_score,
        second.analysis.score.overall_score
    );
}

#[test]
fn test_unknown_role_falls_back() {
    let resume = fixture("sample_resume.txt");
    let jd = fixture("sample_jd.txt");

    let report = engine().analyze(&resume, &jd, Some("astronaut")).unwrap();
    assert_eq!(report.gap_report.role, "sde");
}

#[test]
fn test_empty_resume_is_a_valid_poor_match() {
    let jd = fixture("sample_jd.txt");

    let report = engine().analyze("", &jd, None).unwrap();
    assert!(report.resume_skills.is_empty());
    assert!(report.analysis.score.keyword_coverage < 50.0 || report.jd_skills.is_empty());
    assert!((0.0..=100.0).contains(&report.analysis.score.overall_score));
}

#[test]
fn test_all_output_formats_render() {
    let resume = fixture("sample_resume.txt");
    let jd = fixture("sample_jd.txt");
    let report = engine().analyze(&resume, &jd, None).unwrap();

    let console = ConsoleFormatter::new(false, true).format(&report).unwrap();
    assert!(console.contains("Overall Score"));

    let json = JsonFormatter::pretty().format(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["weights"]["skills_match"].is_number());

    let markdown = MarkdownFormatter::new().format(&report).unwrap();
    assert!(markdown.contains("## Overall Score"));
}
