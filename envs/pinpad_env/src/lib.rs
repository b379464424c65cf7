use async_trait::async_trait;
use horizons_core::{
    config_or_default, register_environment_with_config, EngineError, Environment, Observation,
    Snapshot, ToolCall,
};
use pinpad_rs::{
    Action, Layout, LayoutName, PinPad, PinPadError, ResetOptions, Target, OBSERVATION_SPACE,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::sync::Arc;

pub const DEFAULT_SEED: u64 = 42;

/// Missing fields fall back to the defaults below, whichever way the config arrives.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Preset map name (`three` .. `eight`).
    pub layout: Option<String>,
    /// Explicit map text; wins over `layout`.
    pub layout_text: Option<String>,
    /// Single-target pattern, e.g. `"1234"`.
    pub target: Option<String>,
    /// Multi-target patterns; wins over `target`.
    pub targets: Option<Vec<String>>,
    pub seed: Option<u64>,
    /// Attach the rendered frame to every observation.
    pub include_image: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: Some(LayoutName::Three.to_string()),
            layout_text: None,
            target: None,
            targets: None,
            seed: Some(DEFAULT_SEED),
            include_image: Some(true),
        }
    }
}

fn map_pinpad_err(err: PinPadError) -> EngineError {
    EngineError::Validation(err.to_string())
}

fn target_from_config(config: &Config) -> Target {
    match (&config.targets, &config.target) {
        (Some(patterns), _) => Target::multi(patterns),
        (None, Some(pattern)) => Target::single(pattern),
        (None, None) => Target::default(),
    }
}

fn layout_from_config(config: &Config) -> Result<Layout, EngineError> {
    if let Some(text) = &config.layout_text {
        return Layout::parse(text).map_err(map_pinpad_err);
    }
    let name: LayoutName = config
        .layout
        .as_deref()
        .unwrap_or(LayoutName::Three.as_str())
        .parse()
        .map_err(map_pinpad_err)?;
    pinpad_rs::preset_layout(name).map_err(map_pinpad_err)
}

pub struct PinPadEnvironment {
    env: PinPad,
    include_image: bool,
    num_steps: u64,
    reward_last: f64,
    total_reward: f64,
}

impl PinPadEnvironment {
    pub fn new(config: Config) -> Result<Self, EngineError> {
        let layout = layout_from_config(&config)?;
        let mut env = PinPad::from_layout(layout, target_from_config(&config)).map_err(map_pinpad_err)?;
        env.reset(Some(config.seed.unwrap_or(DEFAULT_SEED)), None).map_err(map_pinpad_err)?;
        Ok(Self {
            env,
            include_image: config.include_image.unwrap_or(true),
            num_steps: 0,
            reward_last: 0.0,
            total_reward: 0.0,
        })
    }

    pub fn engine(&self) -> &PinPad { &self.env }

    fn snapshot_obs(&self, event: &str, extra: Json) -> Observation {
        let info = self.env.info();
        let image = if self.include_image {
            json!(self.env.render().as_bytes())
        } else {
            Json::Null
        };
        Observation {
            terminated: false,
            truncated: false,
            data: json!({
                "player": [info.player.0, info.player.1],
                "sequence": info.sequence,
                "num_steps": self.num_steps,
                "reward_last": self.reward_last,
                "total_reward": self.total_reward,
                "image": image,
                "image_shape": OBSERVATION_SPACE.shape,
                "event": event,
                "extra": extra,
            }),
        }
    }

    fn apply_action(&mut self, action: Action) {
        let out = self.env.apply(action);
        self.num_steps += 1;
        self.reward_last = out.reward;
        self.total_reward += out.reward;
    }

    /// Validate every entry up front so a rejected batch leaves the episode untouched.
    fn parse_actions(call: &ToolCall) -> Result<Vec<Action>, EngineError> {
        if call.args.get("action").is_some() {
            let action = Action::try_from(call.arg_i64("action")?).map_err(map_pinpad_err)?;
            return Ok(vec![action]);
        }
        let arr = call
            .args
            .get("actions")
            .and_then(|v| v.as_array())
            .ok_or_else(|| EngineError::Validation("missing 'action' or 'actions'".into()))?;
        arr.iter()
            .map(|v| {
                let id = v
                    .as_i64()
                    .ok_or_else(|| EngineError::Validation("actions entries must be integers".into()))?;
                Action::try_from(id).map_err(map_pinpad_err)
            })
            .collect()
    }

    fn reset_episode(&mut self, call: &ToolCall) -> Result<(), EngineError> {
        let seed: Option<u64> = call.opt_arg("seed")?;
        let player: Option<(usize, usize)> = call.opt_arg("player")?;
        self.env
            .reset(seed, Some(ResetOptions { player }))
            .map_err(map_pinpad_err)?;
        self.num_steps = 0;
        self.reward_last = 0.0;
        self.total_reward = 0.0;
        Ok(())
    }
}

#[async_trait]
impl Environment for PinPadEnvironment {
    async fn initialize(&mut self) -> Result<Observation, EngineError> {
        Ok(self.snapshot_obs("initialize", Json::Null))
    }

    async fn step(&mut self, tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError> {
        let call = tool_calls
            .first()
            .ok_or_else(|| EngineError::Validation("no tool_calls provided".into()))?;
        match call.tool.as_str() {
            "interact" => {
                for action in Self::parse_actions(call)? {
                    self.apply_action(action);
                }
                Ok(self.snapshot_obs("step", Json::Null))
            }
            "reset" => {
                self.reset_episode(call)?;
                Ok(self.snapshot_obs("reset", Json::Null))
            }
            other => Err(EngineError::Validation(format!("unknown tool: {other}"))),
        }
    }

    async fn checkpoint(&self) -> Result<Snapshot, EngineError> {
        let info = self.env.info();
        let data = json!({
            "layout_text": self.env.layout().to_text(),
            "player": [info.player.0, info.player.1],
            "sequence": info.sequence,
            "target": self.env.target(),
            "num_steps": self.num_steps,
            "total_reward": self.total_reward,
        });
        Ok(Snapshot { version: 1, engine: "pinpad".into(), data })
    }

    async fn terminate(&mut self) -> Result<Observation, EngineError> {
        // The engine never ends an episode on its own; closing it is a truncation.
        let mut obs = self.snapshot_obs("terminate", Json::Null);
        obs.truncated = true;
        Ok(obs)
    }
}

pub fn register_default_env() {
    register_environment_with_config(
        "PinPad",
        Arc::new(|cfg: Option<Json>| -> Result<Box<dyn Environment>, EngineError> {
            let cfg: Config = config_or_default(cfg)?;
            tracing::debug!(?cfg, "building PinPad environment");
            Ok(Box::new(PinPadEnvironment::new(cfg)?))
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interact(args: Json) -> Vec<ToolCall> { vec![ToolCall::new("interact", args)] }

    #[tokio::test]
    async fn initialize_reports_player_and_image() {
        let mut env = PinPadEnvironment::new(Config::default()).unwrap();
        let obs = env.initialize().await.unwrap();
        assert!(!obs.terminated && !obs.truncated);
        assert_eq!(obs.data["sequence"], "");
        assert_eq!(obs.data["image"].as_array().unwrap().len(), 64 * 64 * 3);
        assert_eq!(obs.data["image_shape"], json!([64, 64, 3]));
    }

    #[tokio::test]
    async fn walk_onto_target_pays_reward() {
        let cfg = Config {
            layout_text: Some("11\n 2".into()),
            targets: Some(vec!["12".into()]),
            include_image: Some(false),
            ..Config::default()
        };
        let mut env = PinPadEnvironment::new(cfg).unwrap();
        env.step(vec![ToolCall::new("reset", json!({"player": [0, 0]}))]).await.unwrap();
        let obs = env.step(interact(json!({"actions": [3, 1]}))).await.unwrap();
        assert_eq!(obs.data["player"], json!([1, 1]));
        assert_eq!(obs.data["sequence"], "12");
        assert_eq!(obs.data["reward_last"], 1.0);
        assert_eq!(obs.data["num_steps"], 2);
        assert!(obs.data["image"].is_null());

        let snap = env.checkpoint().await.unwrap();
        assert_eq!(snap.engine, "pinpad");
        assert_eq!(snap.data["layout_text"], "11\n 2");
        assert_eq!(snap.data["sequence"], "12");
    }

    #[tokio::test]
    async fn bad_inputs_are_validation_errors() {
        let mut env = PinPadEnvironment::new(Config::default()).unwrap();
        assert!(matches!(env.step(vec![]).await, Err(EngineError::Validation(_))));
        assert!(matches!(env.step(interact(json!({"action": 9}))).await, Err(EngineError::Validation(_))));
        assert!(matches!(env.step(interact(json!({}))).await, Err(EngineError::Validation(_))));
        assert!(matches!(
            env.step(vec![ToolCall::new("fly", Json::Null)]).await,
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            env.step(vec![ToolCall::new("reset", json!({"player": [0, 0]}))]).await,
            Err(EngineError::Validation(_))
        ));
        let bad_layout = Config { layout: Some("nine".into()), ..Config::default() };
        assert!(PinPadEnvironment::new(bad_layout).is_err());
    }

    #[tokio::test]
    async fn seeded_configs_agree() {
        let cfg = Config { layout: Some("seven".into()), seed: Some(9), ..Config::default() };
        let mut a = PinPadEnvironment::new(cfg.clone()).unwrap();
        let mut b = PinPadEnvironment::new(cfg).unwrap();
        assert_eq!(a.initialize().await.unwrap(), b.initialize().await.unwrap());
    }

    #[tokio::test]
    async fn json_config_without_seed_uses_default_seed() {
        let build = || {
            let cfg: Config = config_or_default(Some(json!({"include_image": false}))).unwrap();
            PinPadEnvironment::new(cfg).unwrap()
        };
        let first = build().initialize().await.unwrap();
        for _ in 0..4 {
            assert_eq!(build().initialize().await.unwrap(), first);
        }
        let mut seeded = PinPadEnvironment::new(Config { include_image: Some(false), ..Config::default() }).unwrap();
        assert_eq!(seeded.initialize().await.unwrap(), first);

        let empty: Config = config_or_default(Some(json!({}))).unwrap();
        let mut a = PinPadEnvironment::new(empty.clone()).unwrap();
        let mut b = PinPadEnvironment::new(empty).unwrap();
        let obs = a.initialize().await.unwrap();
        assert_eq!(obs, b.initialize().await.unwrap());
        assert_eq!(obs.data["image"].as_array().unwrap().len(), 64 * 64 * 3);
    }

    #[tokio::test]
    async fn rejected_batch_changes_nothing() {
        let cfg = Config { layout_text: Some("   \n   ".into()), include_image: Some(false), ..Config::default() };
        let mut env = PinPadEnvironment::new(cfg).unwrap();
        let before = env.step(vec![ToolCall::new("reset", json!({"player": [0, 0]}))]).await.unwrap();
        assert!(matches!(
            env.step(interact(json!({"actions": [3, 3, 9]}))).await,
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            env.step(interact(json!({"actions": [3, "east"]}))).await,
            Err(EngineError::Validation(_))
        ));
        assert_eq!(env.engine().player(), (0, 0));
        let after = env.initialize().await.unwrap();
        assert_eq!(after.data["player"], before.data["player"]);
        assert_eq!(after.data["num_steps"], 0);
        assert_eq!(after.data["total_reward"], 0.0);
    }

    #[tokio::test]
    async fn terminate_marks_truncated() {
        let mut env = PinPadEnvironment::new(Config::default()).unwrap();
        let obs = env.terminate().await.unwrap();
        assert!(obs.truncated && !obs.terminated);
        assert_eq!(obs.data["event"], "terminate");
    }
}
