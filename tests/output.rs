use taskboard::output::{format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("taskboard move: t1");
    human.push_summary("result", "proof_required");
    human.push_detail("t1: opened proof-of-work flow");
    human.push_warning("t1: could not save; change reverted");
    human.push_next_step("submit proof of work for t1");

    let rendered = format_human(&human);
    assert!(rendered.contains("taskboard move: t1"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- result: proof_required"));
    assert!(rendered.contains("Details:"));
    assert!(rendered.contains("- t1: opened proof-of-work flow"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- submit proof of work for t1"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("taskboard board: apollo");
    let rendered = format_human(&human);
    assert_eq!(rendered, "taskboard board: apollo");
}
