pub mod camera;
pub mod fog;
pub mod gradient;
pub mod lights;
pub mod scene;
pub mod sky;
pub mod transform;

pub use camera::Camera;
pub use fog::Fog;
pub use gradient::Gradient;
pub use lights::{
    Attenuation, DirectionalLight, PointLight, SceneLights, SpotLight,
    MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};
pub use scene::{GameItem, Scene};
pub use sky::Sky;
pub use transform::Transform;
