// ==========================================
// 人事管理系统 - 组织结构数据仓储
// ==========================================
// 部门: 邻接表存储，子树通过进程内广度优先遍历展开
// 岗位: 按部门/职级/薪资带检索
// ==========================================

mod department;
mod position;


pub use department::{DepartmentCriteria, DepartmentRepository, DEPARTMENT_TARGET};
pub use position::{PositionCriteria, PositionRepository, POSITION_TARGET};
