//! Model training
//!
//! The base learners behind the voting ensemble (decision tree, logistic
//! regression, random forest, gradient boosting), cross-validation and
//! grid search, and the offline training pipeline that produces the
//! artifact bundle.

mod cross_validation;
mod decision_tree;
mod gradient_boosting;
mod grid_search;
mod logistic;
mod random_forest;
mod trainer;

pub use cross_validation::{CrossValidator, CvScores, FoldSplit};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingConfig};
pub use grid_search::{GridSearch, GridSearchResult, ParamGrid};
pub use logistic::LogisticRegression;
pub use random_forest::{MaxFeatures, RandomForest};
pub use trainer::{Trainer, TrainerConfig, TrainingReport};
