use crate::models::ModelDescriptor;

/**
 * \brief 可用模型目录：启动时构建，之后只读。
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    models: Vec<ModelDescriptor>,
}

impl Default for Catalog {
    /**
     * \brief 内置的免费模型列表，顺序即显示顺序。
     */
    fn default() -> Self {
        Self::new(vec![
            ModelDescriptor::new("big-pickle", "Big Pickle", "OpenCode"),
            ModelDescriptor::new("minimax-m2.5-free", "MiniMax M2.5 Free", "MiniMax"),
            ModelDescriptor::new("glm-5-free", "GLM 5 Free", "Zhipu"),
            ModelDescriptor::new("kimi-k2.5-free", "Kimi K2.5 Free", "Moonshot"),
            ModelDescriptor::new("gpt-5-nano", "GPT 5 Nano", "OpenAI"),
        ])
    }
}

impl Catalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    pub fn list_models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /**
     * \brief 按 ID 精确查找模型（区分大小写）。
     */
    pub fn find_model(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id.clone()).collect()
    }

    pub fn default_model(&self) -> Option<&ModelDescriptor> {
        self.models.first()
    }
}
