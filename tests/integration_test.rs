mod common;

use common::*;
use exam_variant_builder::config::Config;
use exam_variant_builder::error::ExamError;
use exam_variant_builder::models::{ExamUpload, GenerationOptions, Question};
use exam_variant_builder::orchestrator::{generate_exam_set, process_exam, App};
use exam_variant_builder::workflow::ParsedExam;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn options(number_of_variants: usize) -> GenerationOptions {
    GenerationOptions {
        number_of_variants,
        ..Default::default()
    }
}

fn scenario_docx() -> Vec<u8> {
    docx(&[
        para("<g3>"),
        para("Question 1: 2+2?"),
        para("A. 3"),
        underlined("#B. 4"),
        para("C. 5"),
        para("D. 6"),
    ])
}

/// `<g0>` 一道题 + `<g3>` 三道题，正确答案正文都以 "right" 开头
fn two_group_docx() -> Vec<u8> {
    let mut paragraphs = vec![para("<g0>")];
    paragraphs.extend(mcq("Question 1: Fixed stem", ["right-1", "w", "x", "y"], 0));
    paragraphs.push(para("<g3>"));
    paragraphs.extend(mcq("Question 2: Second", ["a", "right-2", "b", "c"], 1));
    paragraphs.extend(mcq("Question 3: Third", ["d", "e", "right-3", "f"], 2));
    paragraphs.extend(mcq("Câu 4: Fourth", ["g", "h", "i", "right-4"], 3));
    docx(&paragraphs)
}

fn answer_bodies(question: &Question) -> Vec<String> {
    question.answers.iter().map(|a| a.body().to_string()).collect()
}

#[test]
fn g3_scenario_keeps_pinned_answer_and_key() {
    for seed in 0..30 {
        let mut rng = StdRng::seed_from_u64(seed);
        let set = generate_exam_set("scenario", 1, scenario_docx(), &options(1), &mut rng).unwrap();
        assert_eq!(set.question_count, 1);
        assert_eq!(set.variants.len(), 1);

        let variant = &set.variants[0];
        assert_eq!(variant.answer_key, vec![Some('B')]);

        let reparsed = ParsedExam::from_bytes(variant.bytes.clone()).unwrap();
        assert_eq!(reparsed.questions.len(), 1);
        let question = &reparsed.questions[0];
        assert!(question.text.starts_with("Question 1: 2+2?"));

        let letters: Vec<_> = question.answers.iter().map(|a| a.letter).collect();
        assert_eq!(letters, vec![Some('A'), Some('B'), Some('C'), Some('D')]);
        assert_eq!(question.answers[1].body(), "4");
        assert!(question.answers.iter().all(|a| !a.is_pinned && !a.is_correct));

        let bodies: HashSet<_> = answer_bodies(question).into_iter().collect();
        let expected: HashSet<_> = ["3", "4", "5", "6"].iter().map(|s| s.to_string()).collect();
        assert_eq!(bodies, expected);
    }
}

#[test]
fn two_groups_four_variants() {
    let mut rng = StdRng::seed_from_u64(2024);
    let set = generate_exam_set("batch", 1, two_group_docx(), &options(4), &mut rng).unwrap();

    assert_eq!(set.question_count, 4);
    assert_eq!(set.variants.len(), 4);
    assert_eq!(set.answer_key.codes, vec![101, 102, 103, 104]);
    assert_eq!(set.answer_key.rows.len(), 4);
    assert!(set.answer_key.rows.iter().all(|row| row.len() == 4));

    let mut stems_seen = HashSet::new();
    for (column, variant) in set.variants.iter().enumerate() {
        assert_eq!(variant.file_name, format!("Exam_{}.docx", variant.code));

        let reparsed = ParsedExam::from_bytes(variant.bytes.clone()).unwrap();
        assert_eq!(reparsed.questions.len(), 4);
        assert_eq!(reparsed.questions[0].text, "Question 1: Fixed stem");
        assert_eq!(answer_bodies(&reparsed.questions[0])[0], "right-1");

        for (index, question) in reparsed.questions.iter().enumerate() {
            assert!(question.text.starts_with(&format!("Question {}: ", index + 1)));

            let key = variant.answer_key[index].unwrap();
            assert_eq!(set.answer_key.rows[index][column], key.to_string());
            let keyed = question
                .answers
                .iter()
                .find(|a| a.letter == Some(key))
                .unwrap();
            assert!(keyed.body().starts_with("right-"));
            stems_seen.insert(question.text.clone());
        }
    }
    assert!(stems_seen.iter().any(|s| s.ends_with("Second")));
    assert!(stems_seen.iter().any(|s| s.ends_with("Fourth")));
}

#[test]
fn untouched_content_is_byte_identical() {
    let mut rng = StdRng::seed_from_u64(5);
    let input = two_group_docx();
    let set = generate_exam_set("bytes", 1, input.clone(), &options(2), &mut rng).unwrap();

    for variant in &set.variants {
        for entry in ["word/styles.xml", "[Content_Types].xml", "_rels/.rels"] {
            assert_eq!(read_entry(&variant.bytes, entry), read_entry(&input, entry));
        }

        let document = String::from_utf8(read_entry(&variant.bytes, "word/document.xml")).unwrap();
        assert!(document.contains(HEADER_PARAGRAPH));
        assert!(document.contains(&format!("{}</w:body>", SECTION_PROPERTIES)));
        assert!(!document.contains("w:u w:val=\"single\""));
        assert!(!document.contains("&lt;g3&gt;"));
    }
}

#[test]
fn same_seed_same_output() {
    let first = generate_exam_set(
        "seeded",
        1,
        two_group_docx(),
        &options(3),
        &mut StdRng::seed_from_u64(99),
    )
    .unwrap();
    let second = generate_exam_set(
        "seeded",
        1,
        two_group_docx(),
        &options(3),
        &mut StdRng::seed_from_u64(99),
    )
    .unwrap();
    assert_eq!(first.answer_key, second.answer_key);
}

#[test]
fn document_without_questions_is_copied() {
    let input = docx(&[para("Just a letter."), para("Regards.")]);
    let mut rng = StdRng::seed_from_u64(1);
    let set = generate_exam_set("letter", 1, input.clone(), &options(1), &mut rng).unwrap();
    assert_eq!(set.question_count, 0);
    assert_eq!(
        read_entry(&set.variants[0].bytes, "word/document.xml"),
        read_entry(&input, "word/document.xml")
    );
}

#[test]
fn pipeline_errors() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut run = |bytes: Vec<u8>| generate_exam_set("bad", 1, bytes, &options(1), &mut rng);

    assert!(matches!(
        run(b"not a zip".to_vec()),
        Err(ExamError::InvalidPackage { .. })
    ));
    assert!(matches!(
        run(zip_entries(&[("word/other.xml", "<x/>")])),
        Err(ExamError::InvalidPackage { .. })
    ));
    assert!(matches!(
        run(zip_entries(&[("word/document.xml", "<w:document><w:body></w:document>")])),
        Err(ExamError::MalformedMarkup { .. })
    ));
    assert!(matches!(
        run(zip_entries(&[("word/document.xml", "<w:document/>")])),
        Err(ExamError::MalformedMarkup { .. })
    ));
    assert!(matches!(
        run(docx(&[para("<g3>"), para("A. lonely")])),
        Err(ExamError::OrphanAnswer { .. })
    ));
    assert!(matches!(
        run(docx(&[para("Question 1: x"), para("A. 1"), para("B. 2")])),
        Err(ExamError::WrongAnswerCount { count: 2, .. })
    ));
    assert!(matches!(
        run(docx(&[
            para("Question 1: x"),
            para("A. 1"),
            para("B. 2"),
            para("B. 3"),
            para("D. 4")
        ])),
        Err(ExamError::DuplicateAnswerLetter { letter: 'B', .. })
    ));
}

fn test_config(root: &std::path::Path) -> Config {
    Config {
        input_folder: root.join("input").to_string_lossy().to_string(),
        output_folder: root.join("output").to_string_lossy().to_string(),
        output_log_file: root.join("output.txt").to_string_lossy().to_string(),
        warn_file: root.join("warn.txt").to_string_lossy().to_string(),
        rng_seed: Some(7),
        max_concurrent_exams: 2,
        ..Config::default()
    }
}

#[test]
fn single_variant_writes_docx_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        number_of_variants: 1,
        starting_code: 300,
        ..test_config(dir.path())
    };
    let upload = ExamUpload::new("quiz.docx", scenario_docx());

    let report = process_exam(upload, 1, &config).unwrap();
    assert_eq!(report.outputs, vec!["quiz_Exam_300.docx".to_string()]);
    assert_eq!(report.codes, vec![300]);

    let output = dir.path().join("output");
    assert!(output.join("quiz_Exam_300.docx").exists());
    let report_json = std::fs::read_to_string(output.join("quiz_report.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report_json).unwrap();
    assert_eq!(value["question_count"], 1);
    assert_eq!(value["answer_key"]["rows"][0][0], "B");
}

#[tokio::test]
async fn batch_folder_processing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();

    std::fs::write(input.join("physics.docx"), two_group_docx()).unwrap();
    std::fs::write(
        input.join("physics.toml"),
        "exam_title = \"Physics midterm\"\nsubject = \"Physics\"\n",
    )
    .unwrap();
    std::fs::write(input.join("broken.docx"), b"definitely not a zip").unwrap();
    std::fs::write(input.join("notes.pdf"), b"%PDF").unwrap();

    let stats = App::initialize(config.clone())
        .await
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.variants, 4);

    let output = dir.path().join("output");
    let archive = std::fs::read(output.join("physics_variants.zip")).unwrap();
    assert_eq!(
        entry_names(&archive),
        vec![
            "AnswerKey.xlsx",
            "Exam_101.docx",
            "Exam_102.docx",
            "Exam_103.docx",
            "Exam_104.docx",
            "answer_key.json",
        ]
    );
    let key: serde_json::Value =
        serde_json::from_slice(&read_entry(&archive, "answer_key.json")).unwrap();
    assert_eq!(key["rows"].as_array().unwrap().len(), 4);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output.join("physics_report.json")).unwrap())
            .unwrap();
    assert_eq!(report["exam_title"], "Physics midterm");
    assert_eq!(report["codes"], serde_json::json!([101, 102, 103, 104]));

    let warn = std::fs::read_to_string(&config.warn_file).unwrap();
    assert!(warn.contains("broken.docx"));
    assert!(!warn.contains("physics.docx"));
    assert!(std::fs::read_to_string(&config.output_log_file)
        .unwrap()
        .contains("试卷变体生成日志"));
}

fn body_texts(exam: &ParsedExam) -> Vec<String> {
    exam.lines.iter().map(|line| line.text.clone()).collect()
}

fn assert_no_correctness_marks(bytes: &[u8]) {
    let document = String::from_utf8(read_entry(bytes, "word/document.xml")).unwrap();
    assert!(!document.contains("<w:u "));
    assert!(!document.contains("<w:color "));
}

#[test]
fn answers_sharing_one_paragraph_keep_order_and_key() {
    let input = docx(&[
        para("<g3>"),
        para("Question 1: 2+2?"),
        runs(&[
            ("A. 3 ", Mark::Plain),
            ("B. 4", Mark::Underline),
            (" C. 5 #D. 6", Mark::Plain),
        ]),
        para("Question 2: 1+1?"),
        para("A. 1"),
        para("B. 2"),
        red("C. 2?"),
        para("D. 3"),
    ]);

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let set = generate_exam_set("fused", 1, input.clone(), &options(1), &mut rng).unwrap();
        let variant = &set.variants[0];
        assert_no_correctness_marks(&variant.bytes);

        let reparsed = ParsedExam::from_bytes(variant.bytes.clone()).unwrap();
        let texts = body_texts(&reparsed);
        let fused = "A. 3 B. 4 C. 5 D. 6";
        assert_eq!(texts.iter().filter(|t| t.as_str() == fused).count(), 1);

        let index = reparsed
            .questions
            .iter()
            .position(|q| q.text.ends_with("2+2?"))
            .unwrap();
        let question = &reparsed.questions[index];
        let letters: Vec<_> = question.answers.iter().filter_map(|a| a.letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D']);
        assert_eq!(answer_bodies(question), vec!["3", "4", "5", "6"]);
        assert_eq!(variant.answer_key[index], Some('B'));
    }
}

#[test]
fn answers_split_across_two_paragraphs() {
    let input = docx(&[
        para("Question 1: Capital of France?"),
        runs(&[("A. Rome ", Mark::Plain), ("B. Oslo", Mark::Plain)]),
        runs(&[("C. ", Mark::Plain), ("Paris", Mark::Red), (" D. Bern", Mark::Plain)]),
    ]);

    let mut rng = StdRng::seed_from_u64(3);
    let set = generate_exam_set("split", 1, input, &options(2), &mut rng).unwrap();
    for variant in &set.variants {
        assert_eq!(variant.answer_key, vec![Some('C')]);
        assert_no_correctness_marks(&variant.bytes);

        let reparsed = ParsedExam::from_bytes(variant.bytes.clone()).unwrap();
        assert_eq!(
            body_texts(&reparsed),
            vec![
                "SCHOOL EXAM",
                "Question 1: Capital of France?",
                "A. Rome B. Oslo",
                "C. Paris D. Bern",
            ]
        );
        let question = &reparsed.questions[0];
        assert_eq!(answer_bodies(question), vec!["Rome", "Oslo", "Paris", "Bern"]);
        let letters: Vec<_> = question.answers.iter().filter_map(|a| a.letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D']);
    }
}

#[test]
fn out_of_order_shared_markers_follow_the_key() {
    let input = docx(&[
        para("Question 1: Pick the right one"),
        runs(&[
            ("B. wrong ", Mark::Plain),
            ("A. right", Mark::Underline),
            (" C. x D. y", Mark::Plain),
        ]),
    ]);

    let mut rng = StdRng::seed_from_u64(1);
    let set = generate_exam_set("order", 1, input, &options(1), &mut rng).unwrap();
    let variant = &set.variants[0];
    assert_eq!(variant.answer_key, vec![Some('B')]);

    let reparsed = ParsedExam::from_bytes(variant.bytes.clone()).unwrap();
    let question = &reparsed.questions[0];
    let keyed = question
        .answers
        .iter()
        .find(|a| a.letter == Some('B'))
        .unwrap();
    assert_eq!(keyed.body(), "right");
    assert_eq!(answer_bodies(question), vec!["wrong", "right", "x", "y"]);
}

#[test]
fn multi_paragraph_stem_keeps_order_and_only_relabels_first() {
    let passage = ["The river flows north.", "It rises in the mountains."];
    let mut paragraphs = vec![
        para("<g1>"),
        para("Câu 7: Read the passage."),
        para(passage[0]),
        para(passage[1]),
    ];
    paragraphs.extend(["A. north", "B. south", "C. east", "D. west"].map(para));
    paragraphs.extend(mcq("Question 8: Another", ["p", "q", "r", "s"], 0));
    let input = docx(&paragraphs);

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let set =
            generate_exam_set("passage", 1, input.clone(), &options(1), &mut rng).unwrap();
        let variant = &set.variants[0];

        let document =
            String::from_utf8(read_entry(&variant.bytes, "word/document.xml")).unwrap();
        for line in passage {
            assert!(document.contains(&para(line)));
        }

        let reparsed = ParsedExam::from_bytes(variant.bytes.clone()).unwrap();
        assert_eq!(reparsed.questions.len(), 2);
        let (index, question) = reparsed
            .questions
            .iter()
            .enumerate()
            .find(|(_, q)| q.text.contains("Read the passage."))
            .unwrap();
        assert_eq!(
            question.text,
            format!(
                "Question {}: Read the passage.\n{}\n{}",
                index + 1,
                passage[0],
                passage[1]
            )
        );
        assert_eq!(question.source_nodes.len(), 3);
        assert_eq!(answer_bodies(question), vec!["north", "south", "east", "west"]);
    }
}
