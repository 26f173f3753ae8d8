//! Seeds the screening content on first start.
//!
//! Ten observation scenarios, one guiding question each, and a common
//! three-step recording protocol.

use brightpath_core::model::{Question, RecordingStep, Scenario};
use brightpath_storage::{AssessmentStore, StorageError};
use tracing::info;

struct ScenarioSeed {
    name: &'static str,
    description: &'static str,
    img_path: &'static str,
    level: &'static str,
    model_name: &'static str,
    priority: u32,
    question: &'static str,
}

const SCENARIOS: &[ScenarioSeed] = &[
    ScenarioSeed {
        name: "Social Interaction Test",
        description: "Observe if the child makes regular eye contact when spoken to.",
        img_path: "images/scenarios/social_interaction.jpg",
        level: "Easy",
        model_name: "social_interaction_model",
        priority: 1,
        question: "Does the child make regular eye contact?",
    },
    ScenarioSeed {
        name: "Response to Name",
        description: "Call the child's name and see if they respond without visual cues.",
        img_path: "images/scenarios/response_to_name.jpg",
        level: "Easy",
        model_name: "response_name_model",
        priority: 2,
        question: "Does the child respond when called by name?",
    },
    ScenarioSeed {
        name: "Joint Attention Task",
        description: "Point at a distant object and observe if the child follows your point.",
        img_path: "images/scenarios/joint_attention.jpg",
        level: "Medium",
        model_name: "joint_attention_model",
        priority: 3,
        question: "Does the child follow your gestures, like pointing?",
    },
    ScenarioSeed {
        name: "Imitative Behavior",
        description: "Perform simple gestures like clapping and check if the child imitates.",
        img_path: "images/scenarios/imitative_behavior.jpg",
        level: "Medium",
        model_name: "imitative_behavior_model",
        priority: 4,
        question: "Does the child imitate simple actions like clapping?",
    },
    ScenarioSeed {
        name: "Pretend Play Observation",
        description: "Offer toys and check if the child engages in pretend play.",
        img_path: "images/scenarios/pretend_play.jpg",
        level: "Medium",
        model_name: "pretend_play_model",
        priority: 5,
        question: "Does the child engage in pretend play with toys?",
    },
    ScenarioSeed {
        name: "Unusual Sensory Reaction",
        description: "Introduce unusual sounds/textures and observe the child's reaction.",
        img_path: "images/scenarios/sensory_reaction.jpg",
        level: "Hard",
        model_name: "sensory_reaction_model",
        priority: 6,
        question: "Does the child show unusual responses to sensory stimuli?",
    },
    ScenarioSeed {
        name: "Repetitive Behavior Monitoring",
        description: "Watch for repetitive movements like hand flapping or rocking.",
        img_path: "images/scenarios/repetitive_behavior.jpg",
        level: "Hard",
        model_name: "repetitive_behavior_model",
        priority: 7,
        question: "Does the child show repetitive behaviors, like hand flapping?",
    },
    ScenarioSeed {
        name: "Language and Communication",
        description: "Initiate conversation and assess back-and-forth communication ability.",
        img_path: "images/scenarios/language_communication.jpg",
        level: "Medium",
        model_name: "language_communication_model",
        priority: 8,
        question: "Can the child hold a basic conversation or exchange words?",
    },
    ScenarioSeed {
        name: "Emotional Response to Situations",
        description: "Pretend scenarios like hurting yourself and observe emotional responses.",
        img_path: "images/scenarios/emotional_response.jpg",
        level: "Hard",
        model_name: "emotional_response_model",
        priority: 9,
        question: "Does the child respond with empathy when someone is hurt?",
    },
    ScenarioSeed {
        name: "Routine Change Tolerance",
        description: "Change a small routine and observe if the child shows distress.",
        img_path: "images/scenarios/routine_change.jpg",
        level: "Hard",
        model_name: "routine_change_model",
        priority: 10,
        question: "Does the child show distress when there is a change in routine?",
    },
];

struct StepSeed {
    number: u32,
    name: &'static str,
    description: &'static str,
    img_path: &'static str,
    expected_duration_secs: u64,
}

const STEPS: &[StepSeed] = &[
    StepSeed {
        number: 1,
        name: "Preparation",
        description: "Prepare the environment and ensure the child is comfortable.",
        img_path: "images/steps/preparation.jpg",
        expected_duration_secs: 60,
    },
    StepSeed {
        number: 2,
        name: "Instruction",
        description: "Explain the task to the child in simple terms.",
        img_path: "images/steps/instruction.jpg",
        expected_duration_secs: 30,
    },
    StepSeed {
        number: 3,
        name: "Observation",
        description: "Observe and record the child's behavior during the task.",
        img_path: "images/steps/observation.jpg",
        expected_duration_secs: 120,
    },
];

/// Populates scenarios, questions and recording steps when the store holds
/// none. Idempotent across restarts of a persistent backend.
pub async fn seed_scenarios(store: &dyn AssessmentStore) -> Result<(), StorageError> {
    if !store.list_scenarios().await?.is_empty() {
        return Ok(());
    }

    for seed in SCENARIOS {
        let scenario = Scenario::new(
            seed.name,
            seed.description,
            seed.img_path,
            seed.level,
            seed.model_name,
            seed.priority,
        );
        store.create_scenario(&scenario).await?;
        store
            .create_question(&Question::new(scenario.id, seed.question, seed.priority))
            .await?;
        for step in STEPS {
            store
                .create_recording_step(&RecordingStep::new(
                    scenario.id,
                    step.number,
                    step.name,
                    step.description,
                    step.img_path,
                    step.expected_duration_secs,
                ))
                .await?;
        }
    }

    info!(scenarios = SCENARIOS.len(), "seeded screening content");
    Ok(())
}
