use intcode_core::{EngineConfig, Pipeline, PipelineError, Topology, Word};

const FEEDBACK_A: [i64; 29] = [
    3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28, 1005,
    28, 6, 99, 0, 0, 5,
];

const FEEDBACK_B: [i64; 57] = [
    3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55, 26, 1001, 54, -5, 54,
    1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001, 55, 1, 55, 2, 53, 55, 53, 4, 53, 1001, 56,
    -1, 56, 1005, 56, 6, 99, 0, 0, 0, 0, 10,
];

fn words(values: &[i64]) -> Vec<Word> {
    values.iter().copied().map(Word::from).collect()
}

fn drive(program: &[i64], phases: &[i64], topology: Topology) -> Result<Word, PipelineError> {
    Pipeline::new(program, phases.len(), EngineConfig::default())
        .with_topology(topology)
        .run(&words(phases), Word::from(0))
}

fn feedback(program: &[i64], phases: &[i64]) -> Result<Word, PipelineError> {
    drive(program, phases, Topology::Feedback)
}

fn serial(program: &[i64], phases: &[i64]) -> Result<Word, PipelineError> {
    drive(program, phases, Topology::Serial)
}

#[test]
fn feedback_pipeline_final_signal() {
    assert_eq!(
        feedback(&FEEDBACK_A, &[9, 8, 7, 6, 5]),
        Ok(Word::from(139_629_729))
    );
    assert_eq!(feedback(&FEEDBACK_B, &[9, 7, 8, 5, 6]), Ok(Word::from(18_216)));
}

#[test]
fn serial_pipelines() {
    let first: &[i64] = &[3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];
    let second: &[i64] = &[
        3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23, 23, 4, 23, 99,
        0, 0,
    ];
    let third: &[i64] = &[
        3, 31, 3, 32, 1002, 32, 10, 32, 1001, 31, -2, 31, 1007, 31, 0, 33, 1002, 33, 7, 33, 1, 33,
        31, 31, 1, 32, 31, 31, 4, 31, 99, 0, 0, 0,
    ];
    assert_eq!(serial(first, &[4, 3, 2, 1, 0]), Ok(Word::from(43210)));
    assert_eq!(serial(second, &[0, 1, 2, 3, 4]), Ok(Word::from(54321)));
    assert_eq!(serial(third, &[1, 0, 4, 3, 2]), Ok(Word::from(65210)));
}

#[test]
fn stages_are_halted_and_independent_after_feedback_run() {
    let mut pipeline = Pipeline::new(FEEDBACK_A, 5, EngineConfig::default());
    pipeline
        .run(&words(&[9, 8, 7, 6, 5]), Word::from(0))
        .unwrap();
    assert!(pipeline.all_halted());
    for stage in pipeline.stages() {
        assert_eq!(stage.outputs().len(), 5);
        assert_eq!(stage.memory().as_slice()[28], Word::from(0));
    }
    // Last stage's newest output is the pipeline result.
    assert_eq!(
        pipeline.stages()[4].last_output(),
        Some(&Word::from(139_629_729))
    );
}
